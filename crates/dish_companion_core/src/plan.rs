//! crates/dish_companion_core/src/plan.rs
//!
//! Builds the ordered, timed list of agent messages for one conversational
//! turn. Plans are plain data; a conversation task walks the steps.

use crate::domain::{CardData, DishRecognitionResult, MessageDraft, RestaurantRef};
use crate::intent::Opener;
use crate::ports::ApiFailure;
use std::time::Duration;

/// Never more than this many restaurant messages per turn.
pub const MAX_RESTAURANT_STEPS: usize = 3;

pub const DISH_IMAGE_REF: &str = "images/dish.jpg";
pub const RESTAURANT_IMAGE_REF: &str = "images/restaurant.jpg";
pub const NEARBY_IMAGE_REF: &str = "images/nearby-map.jpg";

/// Delays between the agent messages of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTiming {
    pub dish_image: Duration,
    pub intro: Duration,
    pub restaurant: Duration,
    pub canned: Duration,
}

impl Default for TurnTiming {
    fn default() -> Self {
        Self {
            dish_image: Duration::from_millis(1000),
            intro: Duration::from_millis(1000),
            restaurant: Duration::from_millis(1500),
            canned: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub delay: Duration,
    /// Show the "agent is responding" indicator while waiting out `delay`.
    pub emits_typing_before: bool,
    pub draft: MessageDraft,
}

impl Step {
    fn immediate(draft: MessageDraft) -> Self {
        Self {
            delay: Duration::ZERO,
            emits_typing_before: false,
            draft,
        }
    }

    fn typed(delay: Duration, draft: MessageDraft) -> Self {
        Self {
            delay,
            emits_typing_before: true,
            draft,
        }
    }
}

/// A result that is nominally successful but cannot be shown.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("Recognition result has an empty dish name")]
    BlankDishName,
    #[error("Recognition confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),
    #[error("Restaurant #{0} has an empty name")]
    BlankRestaurantName(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    steps: Vec<Step>,
}

impl TurnPlan {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Opener, dish image, then either the restaurant intro followed by up to
    /// `MAX_RESTAURANT_STEPS` restaurant messages or a single "none found" text.
    pub fn for_recognition(
        input: &str,
        result: &DishRecognitionResult,
        timing: &TurnTiming,
    ) -> Result<Self, PlanError> {
        validate(result)?;
        let dish_name = result.dish_name.trim();

        let mut steps = vec![
            Step::immediate(MessageDraft::text(dish_text(
                Opener::detect(input),
                dish_name,
                result.dish_description.as_deref(),
            ))),
            Step::typed(
                timing.dish_image,
                MessageDraft::image(dish_name, DISH_IMAGE_REF, None),
            ),
        ];

        if result.restaurants.is_empty() {
            steps.push(Step::typed(
                timing.intro,
                MessageDraft::text(format!(
                    "I couldn't find any restaurants serving {} nearby right now.",
                    dish_name
                )),
            ));
        } else {
            steps.push(Step::typed(
                timing.intro,
                MessageDraft::text(format!(
                    "Here are some great places where you can find {}:",
                    dish_name
                )),
            ));
            steps.extend(
                result
                    .restaurants
                    .iter()
                    .take(MAX_RESTAURANT_STEPS)
                    .map(|restaurant| Step::typed(timing.restaurant, restaurant_draft(restaurant))),
            );
        }

        Ok(Self { steps })
    }

    /// A single apology whose content depends on the failure's status.
    pub fn for_failure(input: &str, failure: &ApiFailure) -> Self {
        let body = if failure.is_timeout() {
            "That took a little too long. Could you try again?"
        } else {
            match failure.status_code {
                400 => "Could you describe the dish in a bit more detail?",
                500 => "Our food service is having some trouble right now. Please try again later.",
                _ => "Something went wrong on my side. Please try again.",
            }
        };
        let text = format!("{} {}", apology(Opener::detect(input)), body);
        Self {
            steps: vec![Step::immediate(MessageDraft::text(text))],
        }
    }

    /// Places around the user, shown immediately without asking the backend.
    pub fn nearby() -> Self {
        let draft = MessageDraft::image(
            "Here are some places near you:",
            NEARBY_IMAGE_REF,
            Some(CardData::NearbyRestaurants(nearby_restaurants())),
        );
        Self {
            steps: vec![Step::immediate(draft)],
        }
    }

    /// A single canned reply, used when the conversation runs offline.
    pub fn canned(reply: &str, timing: &TurnTiming) -> Self {
        Self {
            steps: vec![Step {
                delay: timing.canned,
                emits_typing_before: false,
                draft: MessageDraft::text(reply),
            }],
        }
    }

    /// Replaces a plan that could not be built.
    pub fn display_trouble() -> Self {
        Self {
            steps: vec![Step::immediate(MessageDraft::text(
                "Sorry, I had trouble displaying that result. Please try again.",
            ))],
        }
    }
}

fn validate(result: &DishRecognitionResult) -> Result<(), PlanError> {
    if result.dish_name.trim().is_empty() {
        return Err(PlanError::BlankDishName);
    }
    if let Some(confidence) = result.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(PlanError::ConfidenceOutOfRange(confidence));
        }
    }
    if let Some(index) = result
        .restaurants
        .iter()
        .position(|restaurant| restaurant.name.trim().is_empty())
    {
        return Err(PlanError::BlankRestaurantName(index));
    }
    Ok(())
}

fn dish_text(opener: Opener, dish_name: &str, description: Option<&str>) -> String {
    let mut text = match opener {
        Opener::Remember => format!("I can help! The dish you're trying to remember is {}.", dish_name),
        Opener::Help => format!("Happy to help! That sounds like {}.", dish_name),
        Opener::Default => format!("Great choice! This is {}.", dish_name),
    };
    if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
        text.push(' ');
        text.push_str(description);
    }
    text
}

fn apology(opener: Opener) -> &'static str {
    match opener {
        Opener::Remember => "Sorry, I couldn't place that dish just yet.",
        Opener::Help => "Sorry, I wasn't able to help with that just now.",
        Opener::Default => "Sorry!",
    }
}

fn restaurant_draft(restaurant: &RestaurantRef) -> MessageDraft {
    let mut lines = vec![restaurant.name.trim().to_string()];
    lines.extend(
        [&restaurant.description, &restaurant.address, &restaurant.distance]
            .into_iter()
            .flatten()
            .cloned(),
    );
    MessageDraft::image(
        lines.join("\n"),
        RESTAURANT_IMAGE_REF,
        Some(CardData::Restaurant(restaurant.clone())),
    )
}

fn nearby_restaurants() -> Vec<RestaurantRef> {
    [
        ("Momo House Espoo", "1.5km"),
        ("Ravintola Nepal", "3km"),
        ("Himali Flavours", "3.5km"),
    ]
    .into_iter()
    .map(|(name, distance)| RestaurantRef {
        name: name.to_string(),
        distance: Some(distance.to_string()),
        ..Default::default()
    })
    .collect()
}
