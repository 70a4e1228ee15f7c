//! Registry of supported voices.
//!
//! Each voice belongs to a category, and the category decides which engine
//! serves it and how fast requests may be sent.

use crate::engine::Pacing;
use crate::error::{Result, TtsError};

/// Which remote engine serves a voice category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Cloud Text-to-Speech, SSML input
    CloudTts,
    /// Gemini speech generation, plain text input
    Gemini,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

/// A group of voices sharing an engine and a request quota
#[derive(Debug, PartialEq, Eq)]
pub struct VoiceCategory {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub engine: EngineKind,
    /// Requests per minute allowed by the engine for this category
    pub quota_rpm: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Voice {
    /// Name sent to the engine
    pub api_name: &'static str,
    /// Friendly name for listings
    pub display_name: &'static str,
    pub category: &'static VoiceCategory,
    pub gender: Gender,
}

impl Voice {
    /// Pacing for requests made with this voice
    pub fn pacing(&self) -> Pacing {
        Pacing::for_quota(self.category.quota_rpm)
    }

    pub fn engine(&self) -> EngineKind {
        self.category.engine
    }
}

pub const DEFAULT_VOICE: &str = "en-US-Studio-Q";

const CHIRP3_HD: VoiceCategory = VoiceCategory {
    id: "chirp3hd",
    label: "Chirp 3: HD",
    description: "Latest generation, most natural",
    engine: EngineKind::CloudTts,
    quota_rpm: 200,
};

const CHIRP_HD: VoiceCategory = VoiceCategory {
    id: "chirphd",
    label: "Chirp HD",
    description: "High-definition neural voices",
    engine: EngineKind::CloudTts,
    quota_rpm: 200,
};

const STUDIO: VoiceCategory = VoiceCategory {
    id: "studio",
    label: "Studio",
    description: "Studio-quality narration voices",
    engine: EngineKind::CloudTts,
    quota_rpm: 500,
};

const NEURAL2: VoiceCategory = VoiceCategory {
    id: "neural2",
    label: "Neural2",
    description: "Second-generation neural voices",
    engine: EngineKind::CloudTts,
    quota_rpm: 1000,
};

const WAVENET: VoiceCategory = VoiceCategory {
    id: "wavenet",
    label: "WaveNet",
    description: "DeepMind WaveNet synthesis",
    engine: EngineKind::CloudTts,
    quota_rpm: 1000,
};

const STANDARD: VoiceCategory = VoiceCategory {
    id: "standard",
    label: "Standard",
    description: "Basic synthesis, fastest",
    engine: EngineKind::CloudTts,
    quota_rpm: 1000,
};

const SPECIALTY: VoiceCategory = VoiceCategory {
    id: "specialty",
    label: "Specialty",
    description: "Purpose-built voices",
    engine: EngineKind::CloudTts,
    quota_rpm: 500,
};

const GEMINI: VoiceCategory = VoiceCategory {
    id: "gemini",
    label: "Gemini",
    description: "Generative voices with style prompts",
    engine: EngineKind::Gemini,
    quota_rpm: 150,
};

pub const CATEGORIES: &[VoiceCategory] = &[
    CHIRP3_HD, CHIRP_HD, STUDIO, NEURAL2, WAVENET, STANDARD, SPECIALTY, GEMINI,
];

macro_rules! voice {
    ($api:literal, $display:literal, $category:ident, $gender:ident) => {
        Voice {
            api_name: $api,
            display_name: $display,
            category: &$category,
            gender: Gender::$gender,
        }
    };
}

pub const VOICES: &[Voice] = &[
    voice!("en-US-Chirp3-HD-Achernar", "Elena", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Achird", "Marcus", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Algenib", "Lucas", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Algieba", "Nathan", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Alnilam", "Oliver", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Aoede", "Mia", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Autonoe", "Sophia", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Callirrhoe", "Isabella", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Charon", "Gabriel", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Despina", "Natalie", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Enceladus", "Benjamin", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Erinome", "Charlotte", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Fenrir", "Erik", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Gacrux", "Amelia", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Iapetus", "Theodore", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Kore", "Lily", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Laomedeia", "Victoria", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Leda", "Ruby", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Orus", "Leo", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Puck", "Felix", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Pulcherrima", "Aria", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Rasalgethi", "Sebastian", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Sadachbia", "Arthur", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Sadaltager", "Owen", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Schedar", "Henry", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Sulafat", "Maya", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Umbriel", "Julian", CHIRP3_HD, Male),
    voice!("en-US-Chirp3-HD-Vindemiatrix", "Clara", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Zephyr", "Willow", CHIRP3_HD, Female),
    voice!("en-US-Chirp3-HD-Zubenelgenubi", "Maxwell", CHIRP3_HD, Male),
    voice!("en-US-Chirp-HD-D", "Derek", CHIRP_HD, Male),
    voice!("en-US-Chirp-HD-F", "Francesca", CHIRP_HD, Female),
    voice!("en-US-Chirp-HD-O", "Ophelia", CHIRP_HD, Female),
    voice!("en-US-Studio-O", "Olivia", STUDIO, Female),
    voice!("en-US-Studio-Q", "James", STUDIO, Male),
    voice!("en-US-Neural2-A", "Aaron", NEURAL2, Male),
    voice!("en-US-Neural2-C", "Sarah", NEURAL2, Female),
    voice!("en-US-Neural2-D", "David", NEURAL2, Male),
    voice!("en-US-Neural2-E", "Emma", NEURAL2, Female),
    voice!("en-US-Neural2-F", "Fiona", NEURAL2, Female),
    voice!("en-US-Neural2-G", "Grace", NEURAL2, Female),
    voice!("en-US-Neural2-H", "Hannah", NEURAL2, Female),
    voice!("en-US-Neural2-I", "Ian", NEURAL2, Male),
    voice!("en-US-Neural2-J", "Jack", NEURAL2, Male),
    voice!("en-US-Wavenet-A", "Alex", WAVENET, Male),
    voice!("en-US-Wavenet-B", "Brian", WAVENET, Male),
    voice!("en-US-Wavenet-C", "Chloe", WAVENET, Female),
    voice!("en-US-Wavenet-D", "Daniel", WAVENET, Male),
    voice!("en-US-Wavenet-E", "Emily", WAVENET, Female),
    voice!("en-US-Wavenet-F", "Faith", WAVENET, Female),
    voice!("en-US-Wavenet-G", "Georgia", WAVENET, Female),
    voice!("en-US-Wavenet-H", "Holly", WAVENET, Female),
    voice!("en-US-Wavenet-I", "Isaac", WAVENET, Male),
    voice!("en-US-Wavenet-J", "Jordan", WAVENET, Male),
    voice!("en-US-Standard-A", "Adam", STANDARD, Male),
    voice!("en-US-Standard-B", "Blake", STANDARD, Male),
    voice!("en-US-Standard-C", "Cora", STANDARD, Female),
    voice!("en-US-Standard-D", "Dylan", STANDARD, Male),
    voice!("en-US-Standard-E", "Eva", STANDARD, Female),
    voice!("en-US-Standard-F", "Freya", STANDARD, Female),
    voice!("en-US-Standard-G", "Gwen", STANDARD, Female),
    voice!("en-US-Standard-H", "Hazel", STANDARD, Female),
    voice!("en-US-Standard-I", "Ivan", STANDARD, Male),
    voice!("en-US-Standard-J", "Jason", STANDARD, Male),
    voice!("en-US-Casual-K", "Kyle", SPECIALTY, Male),
    voice!("en-US-News-K", "Karen", SPECIALTY, Female),
    voice!("en-US-News-L", "Linda", SPECIALTY, Female),
    voice!("en-US-News-N", "Nolan", SPECIALTY, Male),
    voice!("en-US-Polyglot-1", "Marco", SPECIALTY, Male),
    voice!("Zephyr", "Zephyr", GEMINI, Female),
    voice!("Puck", "Puck", GEMINI, Male),
    voice!("Charon", "Charon", GEMINI, Male),
    voice!("Kore", "Kore", GEMINI, Female),
    voice!("Fenrir", "Fenrir", GEMINI, Male),
    voice!("Leda", "Leda", GEMINI, Female),
    voice!("Orus", "Orus", GEMINI, Male),
    voice!("Aoede", "Aoede", GEMINI, Female),
];

/// Look up a voice by its API name
pub fn find_voice(api_name: &str) -> Result<&'static Voice> {
    VOICES
        .iter()
        .find(|v| v.api_name == api_name)
        .ok_or_else(|| TtsError::UnknownVoice(api_name.to_string()))
}

/// Look up a category by id
pub fn find_category(id: &str) -> Option<&'static VoiceCategory> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// All voices in a category, in registry order
pub fn voices_in(category_id: &str) -> impl Iterator<Item = &'static Voice> + '_ {
    VOICES.iter().filter(move |v| v.category.id == category_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn test_default_voice_exists() {
        let voice = find_voice(DEFAULT_VOICE).unwrap();
        assert_eq!(voice.display_name, "James");
        assert_eq!(voice.engine(), EngineKind::CloudTts);
    }

    #[test]
    fn test_unknown_voice() {
        let err = find_voice("en-US-Imaginary-Z").unwrap_err();
        assert!(matches!(err, TtsError::UnknownVoice(_)));
    }

    #[test]
    fn test_api_names_are_unique() {
        let names: HashSet<_> = VOICES.iter().map(|v| v.api_name).collect();
        assert_eq!(names.len(), VOICES.len());
    }

    #[test]
    fn test_every_category_has_voices() {
        for category in CATEGORIES {
            assert!(
                voices_in(category.id).count() > 0,
                "category {} is empty",
                category.id
            );
        }
    }

    #[test]
    fn test_gemini_voices_route_to_gemini() {
        let voice = find_voice("Zephyr").unwrap();
        assert_eq!(voice.engine(), EngineKind::Gemini);
        assert_eq!(voice.pacing().delay, Duration::from_millis(500));
    }

    #[test]
    fn test_studio_pacing() {
        let voice = find_voice("en-US-Studio-O").unwrap();
        assert_eq!(voice.pacing().delay, Duration::from_millis(150));
        assert_eq!(find_category("studio").unwrap().quota_rpm, 500);
    }
}
