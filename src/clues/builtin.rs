//! Offline clue pool: 24 tech companies, enough for a 5x5 ticket.

use super::*;

const TECH_COMPANIES: &[(&str, &str)] = &[
    ("Google", "Known for its search engine and Android OS."),
    ("Apple", "Creator of the iPhone, iPad, and Mac."),
    ("Microsoft", "Developed the Windows operating system."),
    ("Amazon", "An e-commerce giant and cloud computing leader."),
    ("Meta", "Formerly Facebook, this company focuses on the metaverse."),
    ("Tesla", "Famous for its electric vehicles."),
    ("Netflix", "A popular streaming service for movies and TV shows."),
    ("NVIDIA", "A leading manufacturer of graphics processing units (GPUs)."),
    ("Adobe", "Software company known for Photoshop and Acrobat."),
    ("Salesforce", "A cloud-based software company specializing in CRM."),
    ("Oracle", "A multinational company known for its database software."),
    ("Intel", "One of the world's largest chip manufacturers."),
    ("IBM", "A long-standing tech giant also known as 'Big Blue'."),
    ("Sony", "A Japanese conglomerate famous for the PlayStation."),
    ("Samsung", "A South Korean multinational known for its electronics."),
    ("Nintendo", "A video game company that created Mario and Zelda."),
    ("Spotify", "A major music streaming service from Sweden."),
    ("X", "A microblogging and social networking service, formerly Twitter."),
    ("Shopify", "An e-commerce platform for online stores."),
    ("Zoom", "A popular video conferencing software."),
    ("Uber", "A ride-hailing service that has expanded into food delivery."),
    ("Airbnb", "An online marketplace for lodging and tourism activities."),
    ("SpaceX", "An aerospace manufacturer building reusable rockets."),
    ("OpenAI", "An AI research and deployment company behind ChatGPT."),
];

/// Serves the built-in pool regardless of topic
pub struct BuiltinProvider;

#[async_trait]
impl ClueProvider for BuiltinProvider {
    async fn generate(&self, request: &ClueRequest) -> ClueResult<Vec<ClueDraft>> {
        tracing::info!(
            "Using built-in tech company clues for topic '{}'",
            request.topic
        );
        Ok(TECH_COMPANIES
            .iter()
            .map(|(answer, text)| ClueDraft::new(*answer, *text))
            .collect())
    }

    fn name(&self) -> &str {
        "builtin"
    }
}
