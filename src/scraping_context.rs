use crate::{
    config::CrawlConfig, date_normalizer::DateNormalizer, fragment::FragmentExtractor,
};

pub struct ScrapingContext {
    pub crawl_config: CrawlConfig,
    pub fragment_extractor: FragmentExtractor,
    pub date_normalizer: DateNormalizer,
}

impl ScrapingContext {
    pub fn new(crawl_config: CrawlConfig) -> anyhow::Result<Self> {
        let fragment_extractor = FragmentExtractor::new()?;
        let date_normalizer = DateNormalizer::new()?;
        Ok(ScrapingContext {
            crawl_config,
            fragment_extractor,
            date_normalizer,
        })
    }
}
