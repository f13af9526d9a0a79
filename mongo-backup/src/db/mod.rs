//! Document database access: connections and the Extended JSON codec.

pub mod connection;
pub mod extjson;

pub use connection::{Connection, Connector, MongoConnection, MongoConnector};
