pub mod core {
    pub mod config;
    pub mod error;
    pub mod tracing_init;
}

pub mod models {
    pub mod peer;
    pub mod score;
}

pub mod identity {
    pub mod classifier;
    pub mod decoder;
}

pub mod anti_leech {
    pub mod scorer;
}

pub mod api {
    pub mod client;
}

pub mod security {
    pub mod blocklist;
    pub mod ipset;
}

pub mod scan {
    pub mod orchestrator;
    pub mod report;
}

pub mod utils {
    pub mod time;
}
