//! Few-shot classification prompt.
//!
//! The prompt is a fixed preamble (category list, one decision rule per
//! category, worked examples) followed by the message and a fixed footer.
//! The preamble is assembled once from the constant tables below; the
//! message is appended as plain text and never interpreted.

use std::sync::LazyLock;

use crate::pipeline::types::Category;

/// Worked examples shown to the model for one category.
pub struct FewShotExamples {
    pub category: Category,
    pub texts: &'static [&'static str],
}

/// Decision rule for each category, in prompt order.
const DECISION_RULES: [(Category, &str); 4] = [
    (
        Category::FounderSourcing,
        "finding co-founders, high-level company strategy, internal operations, \
         leadership, or investor relations",
    ),
    (
        Category::CandidateSourcing,
        "a job candidate, hiring processes, or recruitment",
    ),
    (
        Category::MarketingIdeasFinding,
        "marketing research, competitive insights, user feedback for marketing, \
         or brainstorming new marketing campaigns and ideas",
    ),
    (
        Category::MarketingPitch,
        "creating or executing specific promotional content, planning a marketing \
         campaign, or launching an A/B test",
    ),
];

/// Worked examples, three per category.
pub static FEW_SHOT_EXAMPLES: [FewShotExamples; 4] = [
    FewShotExamples {
        category: Category::FounderSourcing,
        texts: &[
            "Let's revisit our 12-month runway plan.",
            "Should we go solo to this accelerator or apply as a team?",
            "What's our default decision rule when we disagree?",
        ],
    },
    FewShotExamples {
        category: Category::CandidateSourcing,
        texts: &[
            "Found a cool DevRel on Twitter who knows our stack inside out.",
            "Next round, can we do \"build a tiny feature\" live?",
            "Had to drop a great candidate because we were too slow.",
        ],
    },
    FewShotExamples {
        category: Category::MarketingIdeasFinding,
        texts: &[
            "Users seem to love using us for side projects. Lean into that?",
            "Should we make a \"Switching from X\" guide like Notion did?",
            "Landing page needs better above-the-fold copy.",
        ],
    },
    FewShotExamples {
        category: Category::MarketingPitch,
        texts: &[
            "Just repurposed that blog post into a Twitter carousel.",
            "Working on a case study titled \"From Notion Doc to $10K MRR.\"",
            "We should test plain-text emails vs HTML ones.",
        ],
    },
];

const FOOTER: &str = "\n\n<important>\nOutput only the category name.\n</important>\n";

static PREAMBLE: LazyLock<String> = LazyLock::new(build_preamble);

fn build_preamble() -> String {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();

    let mut out = String::with_capacity(2048);
    out.push_str("<your_job>\n");
    out.push_str(&format!(
        "Classify the following message into one of these categories: {}.\n",
        labels.join(", ")
    ));
    out.push_str("</your_job>\n\n");

    out.push_str(
        "Decide based on the content of the message and the categories. \
         This guide describes when each category applies.\n",
    );
    out.push_str("<logic>\n");
    for (i, (category, rule)) in DECISION_RULES.iter().enumerate() {
        out.push_str(&format!(
            "{}. If the message is about {rule}, classify it as \"{category}\".\n",
            i + 1
        ));
    }
    out.push_str("</logic>\n\n");

    out.push_str("<examples>\n");
    for group in &FEW_SHOT_EXAMPLES {
        out.push_str(&format!("---------------- {} ----------------\n\n", group.category));
        for text in group.texts {
            out.push_str(&format!("Text: \"{text}\"\nLabel: \"{}\"\n\n", group.category));
        }
    }
    out.push_str("---------------- end of examples ----------------\n");
    out.push_str("</examples>\n\n");

    out.push_str("Message: ");
    out
}

/// Render the full classification prompt for `message`.
pub fn render(message: &str) -> String {
    let mut prompt = String::with_capacity(PREAMBLE.len() + message.len() + FOOTER.len());
    prompt.push_str(&PREAMBLE);
    prompt.push_str(message);
    prompt.push_str(FOOTER);
    prompt
}
