mod swarm;
