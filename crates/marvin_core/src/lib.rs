pub mod domain;
pub mod ports;

pub use domain::{
    ChatInput, ChatMessage, MessageType, Source, CANNED_RESPONSES, GREETING, RESPONSE_ID_PREFIX,
    THINKING,
};
pub use ports::{
    Delay, PortError, PortResult, ResponseIdGenerator, ResponsePicker, TemplateData,
    TemplateRenderer,
};
