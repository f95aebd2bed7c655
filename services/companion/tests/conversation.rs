//! End-to-end turns driven against in-memory backends with paused time.

use async_trait::async_trait;
use companion_lib::{
    adapters::{MessageLog, SinkEvent},
    api::ApiClient,
    chat::{Conversation, Responder, TurnState},
    error::ClientError,
};
use dish_companion_core::plan::{DISH_IMAGE_REF, NEARBY_IMAGE_REF, RESTAURANT_IMAGE_REF};
use dish_companion_core::ports::{HttpExchange, HttpRequest, RawResponse};
use dish_companion_core::{
    ApiFailure, ApiResponse, DishDescription, DishRecognitionResult, DishRecognitionService,
    MessageKind, RestaurantRef, Sender,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Answers every recognition with the same outcome, optionally after a pause
/// for inputs containing `slow_keyword`.
struct FakeBackend {
    outcome: ApiResponse<DishRecognitionResult>,
    slow_keyword: Option<&'static str>,
    calls: AtomicUsize,
}

impl FakeBackend {
    fn answering(outcome: ApiResponse<DishRecognitionResult>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            slow_keyword: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow_for(outcome: ApiResponse<DishRecognitionResult>, keyword: &'static str) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            slow_keyword: Some(keyword),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl DishRecognitionService for FakeBackend {
    async fn recognize_dish(
        &self,
        description: &DishDescription,
        _location: Option<&str>,
    ) -> ApiResponse<DishRecognitionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(keyword) = self.slow_keyword {
            if description.as_str().contains(keyword) {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
        self.outcome.clone()
    }
}

#[derive(Debug, PartialEq)]
enum Seen {
    User(String),
    Agent(MessageKind, String, Option<String>),
    Typing(bool),
}

fn seen(log: &MessageLog) -> Vec<Seen> {
    log.events()
        .into_iter()
        .map(|event| match event {
            SinkEvent::Typing(visible) => Seen::Typing(visible),
            SinkEvent::Appended(message) => {
                let text = message.text.unwrap_or_default();
                match message.sender {
                    Sender::User => Seen::User(text),
                    Sender::Agent => Seen::Agent(message.kind, text, message.image_ref),
                }
            }
        })
        .collect()
}

fn agent_texts(log: &MessageLog) -> Vec<String> {
    log.messages()
        .into_iter()
        .filter(|message| message.sender == Sender::Agent)
        .filter_map(|message| message.text)
        .collect()
}

fn restaurant(name: &str) -> RestaurantRef {
    RestaurantRef {
        name: name.to_string(),
        ..Default::default()
    }
}

fn pastry(restaurants: Vec<RestaurantRef>) -> DishRecognitionResult {
    DishRecognitionResult {
        dish_name: "Karjalanpiirakka".to_string(),
        dish_description: Some("A Finnish pastry".to_string()),
        restaurants,
        confidence: None,
    }
}

fn text(body: &str) -> Seen {
    Seen::Agent(MessageKind::Text, body.to_string(), None)
}

fn image(body: &str, image_ref: &str) -> Seen {
    Seen::Agent(MessageKind::Image, body.to_string(), Some(image_ref.to_string()))
}

#[tokio::test(start_paused = true)]
async fn a_remember_request_walks_the_full_plan() {
    let log = Arc::new(MessageLog::new());
    let backend = FakeBackend::answering(Ok(pastry(vec![restaurant("Bakery A")])));
    let conversation = Conversation::new(log.clone(), Responder::backend(backend));

    let input = "Can you help me remember this dish?";
    let turn = conversation.submit(input).await.unwrap();
    assert_eq!(turn.finished().await, TurnState::Completed);

    assert_eq!(
        seen(&log),
        vec![
            Seen::User(input.to_string()),
            Seen::Typing(true),
            text("I can help! The dish you're trying to remember is Karjalanpiirakka. A Finnish pastry"),
            image("Karjalanpiirakka", DISH_IMAGE_REF),
            text("Here are some great places where you can find Karjalanpiirakka:"),
            image("Bakery A", RESTAURANT_IMAGE_REF),
            Seen::Typing(false),
        ]
    );
    assert!(!log.is_typing());
    assert_eq!(conversation.active_turn().await, None);

    let ids: Vec<_> = log.messages().iter().map(|message| message.id).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test(start_paused = true)]
async fn at_most_three_restaurants_are_shown() {
    let log = Arc::new(MessageLog::new());
    let restaurants = ["A", "B", "C", "D", "E"].into_iter().map(restaurant).collect();
    let backend = FakeBackend::answering(Ok(pastry(restaurants)));
    let conversation = Conversation::new(log.clone(), Responder::backend(backend));

    let turn = conversation.submit("flaky rye pastry").await.unwrap();
    assert_eq!(turn.finished().await, TurnState::Completed);

    let restaurant_messages = log
        .messages()
        .into_iter()
        .filter(|message| message.image_ref.as_deref() == Some(RESTAURANT_IMAGE_REF))
        .count();
    assert_eq!(restaurant_messages, 3);
    assert_eq!(log.messages().len(), 7);
}

#[tokio::test(start_paused = true)]
async fn a_newer_turn_stops_the_older_one_mid_plan() {
    let log = Arc::new(MessageLog::new());
    let backend = FakeBackend::answering(Ok(pastry(vec![restaurant("Bakery A")])));
    let conversation = Conversation::new(log.clone(), Responder::backend(backend));

    let first = conversation.submit("rye pastry with rice").await.unwrap();
    // Opener at 0ms and dish image at 1000ms; the intro would follow at 2000ms.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let second = conversation.submit("anything nearby?").await.unwrap();
    assert_eq!(second.finished().await, TurnState::Completed);
    assert_eq!(first.finished().await, TurnState::Superseded);

    assert_eq!(
        seen(&log),
        vec![
            Seen::User("rye pastry with rice".to_string()),
            Seen::Typing(true),
            text("Great choice! This is Karjalanpiirakka. A Finnish pastry"),
            image("Karjalanpiirakka", DISH_IMAGE_REF),
            Seen::User("anything nearby?".to_string()),
            Seen::Typing(true),
            image("Here are some places near you:", NEARBY_IMAGE_REF),
            Seen::Typing(false),
        ]
    );

    // Nothing from the first turn shows up later either.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(log.messages().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn a_superseded_turn_abandons_its_backend_call() {
    let log = Arc::new(MessageLog::new());
    let backend = FakeBackend::slow_for(Ok(pastry(Vec::new())), "slow");
    let conversation = Conversation::new(log.clone(), Responder::backend(backend.clone()));

    let first = conversation.submit("the slow one").await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    let second = conversation.submit("the quick one").await.unwrap();

    assert_eq!(second.finished().await, TurnState::Completed);
    assert_eq!(first.finished().await, TurnState::Superseded);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);

    assert_eq!(
        agent_texts(&log),
        vec![
            "Great choice! This is Karjalanpiirakka. A Finnish pastry".to_string(),
            "Karjalanpiirakka".to_string(),
            "I couldn't find any restaurants serving Karjalanpiirakka nearby right now.".to_string(),
        ]
    );
    assert!(!log.is_typing());
}

#[tokio::test(start_paused = true)]
async fn backend_failures_become_a_single_apology() {
    let cases = [
        (
            "pad thai",
            ApiFailure::protocol(400, "Description is required"),
            "Sorry! Could you describe the dish in a bit more detail?",
        ),
        (
            "help me find pad thai",
            ApiFailure::protocol(500, "Internal Server Error"),
            "Sorry, I wasn't able to help with that just now. Our food service is having some trouble right now. Please try again later.",
        ),
        (
            "pad thai",
            ApiFailure::protocol(503, "Service Unavailable"),
            "Sorry! Something went wrong on my side. Please try again.",
        ),
        (
            "I can't remember its name",
            ApiFailure::transport("connection refused"),
            "Sorry, I couldn't place that dish just yet. Something went wrong on my side. Please try again.",
        ),
    ];

    for (input, failure, expected) in cases {
        let log = Arc::new(MessageLog::new());
        let backend = FakeBackend::answering(Err(failure));
        let conversation = Conversation::new(log.clone(), Responder::backend(backend));

        let turn = conversation.submit(input).await.unwrap();
        assert_eq!(turn.finished().await, TurnState::Completed);
        assert_eq!(agent_texts(&log), vec![expected.to_string()], "input: {input}");
        assert!(!log.is_typing());
    }
}

#[tokio::test(start_paused = true)]
async fn unusable_results_are_reported_as_display_trouble() {
    let blank_name = DishRecognitionResult {
        dish_name: "   ".to_string(),
        ..pastry(Vec::new())
    };
    let bad_confidence = DishRecognitionResult {
        confidence: Some(1.7),
        ..pastry(Vec::new())
    };

    for result in [blank_name, bad_confidence] {
        let log = Arc::new(MessageLog::new());
        let backend = FakeBackend::answering(Ok(result));
        let conversation = Conversation::new(log.clone(), Responder::backend(backend));

        let turn = conversation.submit("rye pastry").await.unwrap();
        assert_eq!(turn.finished().await, TurnState::Completed);
        assert_eq!(
            agent_texts(&log),
            vec!["Sorry, I had trouble displaying that result. Please try again.".to_string()]
        );
    }
}

/// Counts exchanges and never answers.
struct SilentExchange {
    calls: AtomicUsize,
}

#[async_trait]
impl HttpExchange for SilentExchange {
    async fn execute(&self, _request: &HttpRequest) -> Result<RawResponse, ApiFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn blank_input_never_reaches_the_network() {
    let exchange = Arc::new(SilentExchange {
        calls: AtomicUsize::new(0),
    });
    let client = ApiClient::new(exchange.clone(), Url::parse("http://localhost:8000").unwrap());
    let log = Arc::new(MessageLog::new());
    let conversation = Conversation::new(log.clone(), Responder::backend(Arc::new(client)));

    let result = conversation.submit(" \t ").await;
    assert!(matches!(result, Err(ClientError::Validation(_))));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(exchange.calls.load(Ordering::SeqCst), 0);
    assert!(log.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_silent_backend_times_out_into_an_apology() {
    let exchange = Arc::new(SilentExchange {
        calls: AtomicUsize::new(0),
    });
    let client = ApiClient::new(exchange.clone(), Url::parse("http://localhost:8000").unwrap())
        .with_timeout(Duration::from_secs(2));
    let log = Arc::new(MessageLog::new());
    let conversation = Conversation::new(log.clone(), Responder::backend(Arc::new(client)));

    let turn = conversation.submit("pad thai").await.unwrap();
    assert_eq!(turn.finished().await, TurnState::Completed);

    assert_eq!(exchange.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        agent_texts(&log),
        vec!["Sorry! That took a little too long. Could you try again?".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn closing_during_planning_drops_the_pending_call() {
    let exchange = Arc::new(SilentExchange {
        calls: AtomicUsize::new(0),
    });
    let client = ApiClient::new(exchange.clone(), Url::parse("http://localhost:8000").unwrap());
    let log = Arc::new(MessageLog::new());
    let conversation = Conversation::new(log.clone(), Responder::backend(Arc::new(client)));

    let turn = conversation.submit("pad thai").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(exchange.calls.load(Ordering::SeqCst), 1);

    conversation.close().await;
    let closed_at = tokio::time::Instant::now();
    assert_eq!(turn.finished().await, TurnState::Superseded);

    assert!(closed_at.elapsed() < Duration::from_secs(1), "took {:?}", closed_at.elapsed());
    assert_eq!(log.messages().len(), 1);
    assert!(!log.is_typing());
}
