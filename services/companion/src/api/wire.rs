//! services/companion/src/api/wire.rs
//!
//! JSON shapes exchanged with the dish backend. These "impure" records are
//! mapped onto the core domain types right after decoding.

use dish_companion_core::{
    DishAnalysis, DishRecognitionResult, HealthStatus, RestaurantRef, SimilarDish,
};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Request Bodies
//=========================================================================================

#[derive(Serialize, Debug)]
pub(crate) struct RecognizeDishBody<'a> {
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
}

//=========================================================================================
// Response Records
//=========================================================================================

#[derive(Deserialize)]
pub(crate) struct HealthRecord {
    message: String,
    status: String,
}
impl HealthRecord {
    pub fn to_domain(self) -> HealthStatus {
        HealthStatus {
            message: self.message,
            status: self.status,
        }
    }
}

#[derive(Deserialize)]
struct RestaurantRecord {
    name: String,
    address: Option<String>,
    description: Option<String>,
    distance: Option<String>,
}
impl RestaurantRecord {
    fn to_domain(self) -> RestaurantRef {
        RestaurantRef {
            name: self.name,
            address: self.address,
            description: self.description,
            distance: self.distance,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct DishRecognitionRecord {
    dish_name: String,
    dish_description: Option<String>,
    restaurants: Vec<RestaurantRecord>,
    confidence: Option<f64>,
}
impl DishRecognitionRecord {
    pub fn to_domain(self) -> DishRecognitionResult {
        DishRecognitionResult {
            dish_name: self.dish_name,
            dish_description: self.dish_description,
            restaurants: self
                .restaurants
                .into_iter()
                .map(RestaurantRecord::to_domain)
                .collect(),
            confidence: self.confidence,
        }
    }
}

#[derive(Deserialize)]
struct SimilarDishRecord {
    dish_name: String,
    similarity_score: f64,
    similarity_reason: String,
}

#[derive(Deserialize)]
pub(crate) struct DishAnalysisRecord {
    dish_name: String,
    dish_description: String,
    taste_profile: String,
    ingredients: Vec<String>,
    allergens: Vec<String>,
    dietary_tags: Vec<String>,
    similar_dishes: Vec<SimilarDishRecord>,
    historical_background: Option<String>,
    fun_facts: Option<Vec<String>>,
    ingredient_origins: Option<String>,
    warnings: Option<Vec<String>>,
    processing_time_seconds: Option<f64>,
}
impl DishAnalysisRecord {
    pub fn to_domain(self) -> DishAnalysis {
        DishAnalysis {
            dish_name: self.dish_name,
            dish_description: self.dish_description,
            taste_profile: self.taste_profile,
            ingredients: self.ingredients,
            allergens: self.allergens,
            dietary_tags: self.dietary_tags,
            similar_dishes: self
                .similar_dishes
                .into_iter()
                .map(|dish| SimilarDish {
                    dish_name: dish.dish_name,
                    similarity_score: dish.similarity_score,
                    similarity_reason: dish.similarity_reason,
                })
                .collect(),
            historical_background: self.historical_background,
            fun_facts: self.fun_facts.unwrap_or_default(),
            ingredient_origins: self.ingredient_origins,
            warnings: self.warnings.unwrap_or_default(),
            processing_time_seconds: self.processing_time_seconds,
        }
    }
}
