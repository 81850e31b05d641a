//! Matchmaking prompt builder
//!
//! Pure and deterministic: the same entity sets always give the same text.

use crate::entity::EntitySchema;

/// Render an entity set as a JSON array (falls back to debug output).
fn render_entities(entities: &[EntitySchema]) -> String {
    serde_json::to_string_pretty(entities).unwrap_or_else(|_| format!("{:?}", entities))
}

/// Build the matchmaking instruction for `selected` against `available`.
pub fn build_prompt(available: &[EntitySchema], selected: &[EntitySchema]) -> String {
    format!(
        r#"You are an expert startup ecosystem matchmaker with deep knowledge of startup-enabler partnerships in Davao City.
Analyze the entities below (all based in Davao City) and suggest ideal partnerships based on their compatibility.

## Selected Entities (primary focus)
{selected}

## Available Entities (potential matches)
{available}

## Context
Every match MUST include at least one entity from the Selected Entities list. Never pair two entities that only appear in the Available Entities pool.

All startups and enablers operate in Davao City, so they:
- share an understanding of the local business environment
- can easily meet face to face and collaborate
- belong to the same growing tech and startup ecosystem
- may already have overlapping networks in the local community

## Matching criteria

Startup-Enabler matches:
- Industry alignment (startup industries vs enabler industryFocus)
- Stage compatibility (startup startupStage vs enabler startupStagePreference)
- Business model fit (startup revenueModel vs enabler preferredBusinessModels)
- Support needs (enabler supportType and fundingStageFocus)

Startup-Startup matches:
- Complementary industries
- Similar growth stage
- Potential for collaboration or resource sharing
- Complementary milestone achievements

Enabler-Enabler matches:
- Complementary support types
- Non-overlapping industry focus
- Potential for co-investment or joint programs
- Portfolio complementarity

## For each match
- Include at least one Selected Entity
- Use the entity's startupId or enablerId as entityId and its startUpName or enablerName as name
- Give a certainty between 0 and 1 reflecting alignment strength
- Explain the specific compatibility points, synergies and mutual benefits in the rationale
- Suggest concrete next steps, such as local venues or events for a first meeting

## Output
Return matches in three groups, highest certainty first within each:
1. Top Startup-Enabler Matches
2. Top Startup-Startup Matches
3. Top Enabler-Enabler Matches
"#,
        selected = render_entities(selected),
        available = render_entities(available),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let available = vec![
            test_startup("s1", "Acme", true),
            test_enabler("e1", "Mindanao Angels", false),
        ];
        let selected = vec![available[0].clone()];

        assert_eq!(
            build_prompt(&available, &selected),
            build_prompt(&available, &selected)
        );
    }

    #[test]
    fn test_prompt_embeds_both_sets_and_rules() {
        let available = vec![
            test_startup("s1", "Acme", true),
            test_enabler("e1", "Mindanao Angels", false),
        ];
        let selected = vec![available[0].clone()];
        let prompt = build_prompt(&available, &selected);

        let selected_at = prompt.find("## Selected Entities").unwrap();
        let available_at = prompt.find("## Available Entities").unwrap();
        let selected_block = &prompt[selected_at..available_at];
        assert!(selected_block.contains("\"startupId\": \"s1\""));
        assert!(!selected_block.contains("Mindanao Angels"));
        assert!(prompt[available_at..].contains("Mindanao Angels"));

        for category in [
            "Startup-Enabler matches",
            "Startup-Startup matches",
            "Enabler-Enabler matches",
        ] {
            assert!(prompt.contains(category), "missing {}", category);
        }
        assert!(prompt.contains("at least one entity from the Selected Entities"));
    }
}
