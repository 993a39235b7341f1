pub mod availability;
pub mod buckets;
pub mod models;
pub mod occupancy;
pub mod projection;
pub mod registry;
pub mod time_index;
