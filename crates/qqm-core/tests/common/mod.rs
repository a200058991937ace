pub mod qbit_server;
