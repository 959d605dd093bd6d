pub mod shared {
    pub mod core {
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod auth;
        pub mod backend;
        pub mod notifications;
        pub mod realtime;
    }
}

pub mod modules {
    pub mod live_roster {
        pub mod core {
            pub mod entry;
            pub mod events;
            pub mod evolve;
            pub mod state;
        }
        pub mod store;
        pub mod session;
        pub mod use_cases {
            pub mod errors;
            pub mod request;
            pub mod add_product {
                pub mod command;
                pub mod decide;
                pub mod handler;
            }
            pub mod remove_product {
                pub mod command;
                pub mod decide;
                pub mod handler;
            }
            pub mod toggle_pin {
                pub mod command;
                pub mod decide;
                pub mod handler;
            }
            pub mod refresh_roster {
                pub mod handler;
            }
            pub mod search_products {
                pub mod handler;
            }
            pub mod sync_room_events {
                pub mod backoff;
                pub mod router;
                pub mod supervisor;
            }
        }
        pub mod adapters {
            pub mod inbound {
                pub mod graphql;
                pub mod http;
            }
            pub mod outbound {
                pub mod product_cache;
            }
        }
    }
}

pub mod shell;
