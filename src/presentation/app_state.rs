// Application state for HTTP handlers
use crate::application::message_service::MessageService;

#[derive(Clone)]
pub struct AppState {
    pub message_service: MessageService,
}
