pub mod canned;
pub mod domain;
pub mod intent;
pub mod plan;
pub mod ports;

pub use canned::{canned_reply, FixedPicker, ReplyPicker};
pub use domain::{
    CardData, ChatMessage, DishAnalysis, DishDescription, DishRecognitionResult, HealthStatus,
    MessageDraft, MessageId, MessageKind, RestaurantRef, Sender, SimilarDish, ValidationError,
};
pub use plan::{PlanError, Step, TurnPlan, TurnTiming};
pub use ports::{
    ApiFailure, ApiResponse, DishRecognitionService, FailureKind, HttpExchange, HttpMethod,
    HttpRequest, MessageSink, RawResponse,
};
