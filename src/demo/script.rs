/// One pre-written line of the scripted demo meeting.
#[derive(Debug, Clone, Copy)]
pub struct ScriptLine {
    pub speaker: &'static str,
    pub text: &'static str,
    /// Index of the earlier line this one responds to
    pub related_to: Option<usize>,
}

/// The scripted standup used by the demo feed.
///
/// Back-references form the reply structure the visualization board draws;
/// the closing lines are phrased as explicit per-person commitments so the
/// action item extraction has something to find.
const SCRIPT: &[ScriptLine] = &[
    ScriptLine {
        speaker: "Maya",
        text: "Good morning everyone, let's get started. Shall we go over this week's alpha release?",
        related_to: None,
    },
    ScriptLine {
        speaker: "Priya",
        text: "The UI design is nearly finished, I shared the latest mockups yesterday.",
        related_to: Some(0),
    },
    ScriptLine {
        speaker: "Jonas",
        text: "The backend API is about 80 percent there. Only the auth part is left to finish.",
        related_to: Some(0),
    },
    ScriptLine {
        speaker: "Felix",
        text: "How is the mobile layout coming along?",
        related_to: Some(1),
    },
    ScriptLine {
        speaker: "Priya",
        text: "Tablet and phone are both tested. There was a small layout issue on older phones, but it is fixed now.",
        related_to: Some(3),
    },
    ScriptLine {
        speaker: "Maya",
        text: "Sounds good. When should we schedule the QA pass?",
        related_to: None,
    },
    ScriptLine {
        speaker: "Jonas",
        text: "What if we freeze features on Friday and start QA on Monday?",
        related_to: Some(5),
    },
    ScriptLine {
        speaker: "Felix",
        text: "I agree. I will have the test cases written by Thursday.",
        related_to: Some(6),
    },
    ScriptLine {
        speaker: "Priya",
        text: "Deployment settings still need to be coordinated with the infrastructure team.",
        related_to: Some(6),
    },
    ScriptLine {
        speaker: "Maya",
        text: "I will set up a meeting with them. Let me capture the action items.",
        related_to: None,
    },
    ScriptLine {
        speaker: "Jonas",
        text: "Jonas: finish the backend auth work by Friday.",
        related_to: Some(9),
    },
    ScriptLine {
        speaker: "Felix",
        text: "Felix: write the QA test cases by Thursday.",
        related_to: Some(9),
    },
    ScriptLine {
        speaker: "Priya",
        text: "Priya: review the mobile UI and document the design system.",
        related_to: Some(9),
    },
    ScriptLine {
        speaker: "Maya",
        text: "Maya: coordinate the deployment schedule with infrastructure.",
        related_to: Some(9),
    },
    ScriptLine {
        speaker: "Maya",
        text: "Thanks everyone, nice work. See you all on Monday!",
        related_to: None,
    },
];

pub fn demo_script() -> &'static [ScriptLine] {
    SCRIPT
}
