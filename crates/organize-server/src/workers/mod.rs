pub mod webhook_dispatcher;

pub use webhook_dispatcher::{
    DispatchCall, HttpWebhookDispatcher, RecordingDispatcher, WebhookDispatcher,
};
