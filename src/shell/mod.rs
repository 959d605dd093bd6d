// Composition root for the live roster service.
//
// Responsibilities
// - Read config from the environment.
// - Instantiate the HTTP backend, the WebSocket transport, the token provider and the notifier.
// - Mount one roster session for the configured room.
// - Expose the session over REST and GraphQL.

pub mod config;
pub mod graphql;
pub mod http;
pub mod state;
