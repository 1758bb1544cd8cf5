//! Prompt definitions for the video tour analysis.
//!
//! The response-shape contract lives in the prompt text: the model is asked
//! for a single JSON value and nothing else, and the parser in the parent
//! module is the enforcement side of that bargain.

/// Instruction sent alongside the inline video.
///
/// Asks for the full analysis object: rooms with timestamps, bedroom and
/// bathroom counts, amenity tags, and a short walkthrough narrative. Counts
/// must be omitted rather than guessed, so an absent field stays a "don't
/// know" instead of a false zero.
pub const ROOM_ANALYSIS_PROMPT: &str = r#"Analyze this apartment tour video and identify what rooms are shown and at what timestamps.
Respond ONLY with a single JSON object in this exact format, with no additional text or explanation:
{"rooms": [{"room": "Living Room", "timestamp": "0:00"}, {"room": "Kitchen", "timestamp": "1:23"}], "propertyInfo": {"bedrooms": 2, "bathrooms": 1.5}, "tags": ["hardwood floors", "stainless steel appliances"], "videoDescription": "A one-paragraph summary of the walkthrough."}
List rooms in the order they appear in the video.
For rooms that aren't clearly identifiable, use "Room 1", "Room 2", etc.
Always label bathrooms as "Bathroom" and kitchens as "Kitchen".
Omit "bedrooms" or "bathrooms" from "propertyInfo" when the video does not make them clear; never guess and never use zero as a placeholder."#;
