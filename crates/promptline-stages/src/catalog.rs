//! The built-in pipelines.
//!
//! | name | chaining |
//! |---|---|
//! | `instagram-analysis` | none, every stage reads the posts |
//! | `competitor-team` | none |
//! | `startup-trends` | each stage reads the previous one |
//! | `design-review` | none, stages are selectable |
//! | `competitor-intel` | none |

use promptline_core::{AgentKind, AgentSpec, PipelineDef, StageDef, ToolCapability};

use crate::models::ModelDefaults;

pub const INSTAGRAM_ANALYSIS: &str = "instagram-analysis";
pub const COMPETITOR_TEAM: &str = "competitor-team";
pub const STARTUP_TRENDS: &str = "startup-trends";
pub const DESIGN_REVIEW: &str = "design-review";
pub const COMPETITOR_INTEL: &str = "competitor-intel";

/// Template used for competitor URL discovery outside any pipeline.
pub const DISCOVERY_TEMPLATE: &str = "discovery.competitor_urls";

/// Named pipeline definitions, in a fixed listing order.
#[derive(Debug, Clone)]
pub struct Catalog {
    pipelines: Vec<PipelineDef>,
}

impl Catalog {
    pub fn new(models: &ModelDefaults) -> Self {
        Self {
            pipelines: vec![
                instagram_analysis(models),
                competitor_team(models),
                startup_trends(models),
                design_review(models),
                competitor_intel(models),
            ],
        }
    }

    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.pipelines = self
            .pipelines
            .into_iter()
            .map(|def| def.max_input_chars(max))
            .collect();
        self
    }

    pub fn get(&self, name: &str) -> Option<&PipelineDef> {
        self.pipelines.iter().find(|def| def.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.pipelines.iter().map(|def| def.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineDef> {
        self.pipelines.iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(&ModelDefaults::default())
    }
}

fn web_search() -> AgentKind {
    AgentKind::tools([ToolCapability::WebSearch])
}

pub fn instagram_analysis(models: &ModelDefaults) -> PipelineDef {
    let content = AgentSpec::new("Content Analyst", &models.gemini).instructions([
        "You are an Instagram content analysis expert who:",
        "1. Identifies patterns in the type of content that drives the most engagement",
        "2. Analyzes tone and communication style in the posts",
        "3. Evaluates the effectiveness of captions and calls to action",
        "4. Detects trends in the most successful content",
        "Be specific and give actionable recommendations",
    ]);
    let engagement = AgentSpec::new("Engagement Analyst", &models.gemini).instructions([
        "You are an engagement analysis expert who:",
        "1. Analyzes interaction and engagement patterns",
        "2. Identifies which kinds of posts generate the most interaction",
        "3. Suggests strategies to increase engagement",
        "4. Evaluates the quality of interactions",
        "Focus on metrics and practical improvements",
    ]);
    let strategy = AgentSpec::new("Content Strategist", &models.gemini)
        .instructions([
            "You are a content strategy expert who:",
            "1. Identifies improvement opportunities in the strategy",
            "2. Analyzes competitors and industry trends",
            "3. Suggests content ideas and topics",
            "4. Provides a concrete action plan",
            "Focus on strategic recommendations and planning",
        ])
        .kind(web_search());

    PipelineDef::new(INSTAGRAM_ANALYSIS, "Instagram Analysis")
        .stage(StageDef::new("content_analysis", "Content Analysis", "instagram.content", content))
        .stage(StageDef::new(
            "engagement_analysis",
            "Engagement Analysis",
            "instagram.engagement",
            engagement,
        ))
        .stage(StageDef::new(
            "strategy_analysis",
            "Strategic Recommendations",
            "instagram.strategy",
            strategy,
        ))
}

pub fn competitor_team(models: &ModelDefaults) -> PipelineDef {
    let market = AgentSpec::new("Market Analyst", &models.gemini)
        .instructions([
            "You are a market analysis expert who:",
            "1. Analyzes market and industry trends",
            "2. Identifies opportunities and threats",
            "3. Evaluates market size and potential",
            "4. Analyzes external factors affecting the industry",
            "Provide strategic insights and relevant data",
        ])
        .kind(web_search());
    let competitors = AgentSpec::new("Competitor Analyst", &models.gemini)
        .instructions([
            "You are a competitor analysis expert who:",
            "1. Analyzes the strategies of direct competitors",
            "2. Identifies competitor strengths and weaknesses",
            "3. Evaluates positioning and value proposition",
            "4. Compares products, services and prices",
            "Focus on competitive advantages and differentiation",
        ])
        .kind(web_search());
    let strategy = AgentSpec::new("Competitive Strategist", &models.gemini)
        .instructions([
            "You are a competitive strategy expert who:",
            "1. Develops differentiation strategies",
            "2. Proposes actions to gain market share",
            "3. Identifies niches and opportunities",
            "4. Suggests improvements to the value proposition",
            "Focus on concrete actions and competitive advantages",
        ])
        .kind(web_search());

    PipelineDef::new(COMPETITOR_TEAM, "Competitor Analysis")
        .stage(StageDef::new("market_analysis", "Market Analysis", "competitor_team.market", market))
        .stage(StageDef::new(
            "competitor_analysis",
            "Competitor Analysis",
            "competitor_team.competitors",
            competitors,
        ))
        .stage(StageDef::new(
            "strategy_recommendations",
            "Strategic Recommendations",
            "competitor_team.strategy",
            strategy,
        ))
}

pub fn startup_trends(models: &ModelDefaults) -> PipelineDef {
    let collector = AgentSpec::new("News Collector", &models.anthropic)
        .instruction("Gather latest articles on the topic")
        .kind(AgentKind::tools([ToolCapability::NewsSearch]));
    let summarizer = AgentSpec::new("Summary Writer", &models.anthropic)
        .instruction("Provide concise summaries of the articles")
        .kind(AgentKind::tools([ToolCapability::ArticleReader]));
    let analyzer = AgentSpec::new("Trend Analyzer", &models.anthropic).instruction(
        "Identify emerging trends and startup opportunities in a detailed report \
         that a young entrepreneur can read easily",
    );

    PipelineDef::new(STARTUP_TRENDS, "Startup Trends")
        .stage(StageDef::new("news_collection", "Collected News", "trends.news", collector))
        .stage(
            StageDef::new("article_summaries", "Article Summaries", "trends.summaries", summarizer)
                .chained(),
        )
        .stage(StageDef::new("trend_analysis", "Trend Analysis", "trends.analysis", analyzer).chained())
}

pub fn design_review(models: &ModelDefaults) -> PipelineDef {
    let visual = AgentSpec::new("Visual Design Analyst", &models.gemini)
        .instructions([
            "You are a visual analysis expert who:",
            "1. Identifies design elements, patterns and visual hierarchy",
            "2. Analyzes color schemes, typography and layout",
            "3. Detects user interface components and how they relate",
            "4. Evaluates visual consistency and branding",
            "Be specific and technical in your analysis",
        ])
        .kind(AgentKind::Vision);
    let ux = AgentSpec::new("UX Analyst", &models.gemini)
        .instructions([
            "You are a user experience expert who:",
            "1. Evaluates user flows and interaction patterns",
            "2. Identifies usability problems and opportunities",
            "3. Suggests UX improvements based on best practices",
            "4. Analyzes accessibility and inclusive design",
            "Focus on user insights and practical improvements",
        ])
        .kind(AgentKind::Vision);
    let market = AgentSpec::new("Market Researcher", &models.gemini)
        .instructions([
            "You are a market research expert who:",
            "1. Identifies market trends and competitor patterns",
            "2. Analyzes similar products and their features",
            "3. Suggests market positioning and opportunities",
            "4. Provides industry-specific insights",
            "Focus on actionable market intelligence",
        ])
        .kind(AgentKind::Vision);

    PipelineDef::new(DESIGN_REVIEW, "Design Review")
        .stage(StageDef::new("visual_design", "Visual Design", "design.visual", visual))
        .stage(StageDef::new("user_experience", "User Experience", "design.ux", ux))
        .stage(StageDef::new("market_analysis", "Market Analysis", "design.market", market))
}

pub fn competitor_intel(models: &ModelDefaults) -> PipelineDef {
    let comparison = AgentSpec::new("Comparison Analyst", &models.openai)
        .instruction("You are an expert business analyst who builds structured comparisons");
    let opportunities = AgentSpec::new("Opportunity Analyst", &models.openai)
        .instruction("You identify market opportunities from competitor data");

    PipelineDef::new(COMPETITOR_INTEL, "Competitor Intelligence")
        .stage(StageDef::new(
            "comparison_table",
            "Competitor Comparison",
            "competitor_intel.comparison",
            comparison,
        ))
        .stage(StageDef::new(
            "opportunity_analysis",
            "Market Opportunities",
            "competitor_intel.opportunities",
            opportunities,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_in_order() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.names(),
            vec![INSTAGRAM_ANALYSIS, COMPETITOR_TEAM, STARTUP_TRENDS, DESIGN_REVIEW, COMPETITOR_INTEL]
        );
        assert!(catalog.get("unknown").is_none());
    }

    #[test]
    fn test_only_startup_trends_chains() {
        let catalog = Catalog::default();
        for def in catalog.iter() {
            let chained: Vec<bool> = def.stages.iter().map(|s| s.uses_previous).collect();
            if def.name == STARTUP_TRENDS {
                assert_eq!(chained, vec![false, true, true]);
            } else {
                assert!(chained.iter().all(|c| !c), "{} should not chain", def.name);
            }
        }
    }

    #[test]
    fn test_agent_kinds() {
        let catalog = Catalog::default();
        let instagram = catalog.get(INSTAGRAM_ANALYSIS).unwrap();
        assert_eq!(instagram.stages[0].agent.kind, AgentKind::Text);
        assert!(instagram.stages[2].agent.tool_capabilities().contains(&ToolCapability::WebSearch));

        let design = catalog.get(DESIGN_REVIEW).unwrap();
        assert!(design.stages.iter().all(|s| s.agent.kind.accepts_attachments()));
    }

    #[test]
    fn test_models_follow_defaults() {
        let models = ModelDefaults {
            anthropic: "claude-3-7-sonnet-latest".to_string(),
            ..Default::default()
        };
        let catalog = Catalog::new(&models).with_max_input_chars(1_000);
        let trends = catalog.get(STARTUP_TRENDS).unwrap();
        assert!(trends.stages.iter().all(|s| s.agent.model_id == "claude-3-7-sonnet-latest"));
        assert_eq!(catalog.get(COMPETITOR_INTEL).unwrap().stages[0].agent.model_id, "gpt-4o");
        assert!(catalog.iter().all(|def| def.max_input_chars == 1_000));
    }
}
