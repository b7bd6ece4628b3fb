mod congestion_ops;
mod ipv4_address;
mod protocol_select;
mod queues;
mod sim_time;
mod star_topology;
mod traffic_wiring;
