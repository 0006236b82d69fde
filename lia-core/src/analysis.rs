use serde::{Deserialize, Serialize};

use crate::suggestion::SuggestionSet;
use crate::weather::WeatherSnapshot;

/// Top prediction of the land classifier for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    /// Probability of `label`, in `[0, 1]`
    pub confidence: f32,
}

/// Everything computed for one uploaded image.
///
/// Serializes to the response body of `POST /analyze`:
///
/// ```json
/// {
///   "land_type": "sandbar",
///   "confidence": 0.41,
///   "greenness_index": 0.02,
///   "weather": {"temperature": 28.1, "humidity": 74.0, "description": "haze", "precipitation": 0.0},
///   "suggestions": ["Drought-resistant plants", "Rainwater harvesting", "Solar panels"],
///   "costs": [["Rainwater Tank", 2500], ["Solar Panels per acre", 500000]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub land_type: String,
    pub confidence: f32,
    pub greenness_index: f64,
    pub weather: WeatherSnapshot,
    #[serde(flatten)]
    pub advice: SuggestionSet,
}

impl AnalysisResult {
    pub fn new(
        classification: ClassificationResult,
        greenness_index: f64,
        weather: WeatherSnapshot,
        advice: SuggestionSet,
    ) -> Self {
        AnalysisResult {
            land_type: classification.label,
            confidence: classification.confidence,
            greenness_index,
            weather,
            advice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::suggest;

    #[test]
    fn test_serializes_flat_response_shape() {
        let result = AnalysisResult::new(
            ClassificationResult {
                label: "lakeside".to_string(),
                confidence: 0.5,
            },
            0.2,
            WeatherSnapshot::unavailable(),
            suggest("lakeside", 0.2),
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["land_type"], "lakeside");
        assert_eq!(value["confidence"], 0.5);
        assert_eq!(value["greenness_index"], 0.2);
        assert_eq!(value["weather"]["description"], "Unavailable");
        assert_eq!(value["weather"]["precipitation"], 0.0);
        assert_eq!(value["suggestions"][0], "Solar power setup");
        assert_eq!(value["costs"][0][0], "Solar Setup");
        assert_eq!(value["costs"][0][1], 450000);
        assert!(value.get("advice").is_none());
    }

    #[test]
    fn test_deserializes_own_output() {
        let result = AnalysisResult::new(
            ClassificationResult {
                label: "valley".to_string(),
                confidence: 0.25,
            },
            0.45,
            WeatherSnapshot::unavailable(),
            suggest("valley", 0.45),
        );
        let json = serde_json::to_string(&result).unwrap();
        let parsed: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
