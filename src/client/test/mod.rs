mod server;

mod pipeline;
mod state_sending;
