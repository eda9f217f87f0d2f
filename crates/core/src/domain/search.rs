use serde::{Deserialize, Serialize};

/// One web-search hit after title cleaning and content truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    News,
    Finance,
    #[default]
    General,
}

/// Include and exclude lists never apply together; include wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DomainFilter {
    #[default]
    None,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl DomainFilter {
    pub fn from_lists(include: Option<Vec<String>>, exclude: Option<Vec<String>>) -> Self {
        let include = include.filter(|v| !v.is_empty());
        let exclude = exclude.filter(|v| !v.is_empty());
        match (include, exclude) {
            (Some(include), _) => Self::Include(include),
            (None, Some(exclude)) => Self::Exclude(exclude),
            (None, None) => Self::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub max_results: u32,
    pub topic: Topic,
    pub domains: DomainFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_wins_when_both_filters_are_given() {
        let filter = DomainFilter::from_lists(
            Some(vec!["reuters.com".to_string()]),
            Some(vec!["reddit.com".to_string()]),
        );
        assert_eq!(filter, DomainFilter::Include(vec!["reuters.com".to_string()]));
    }

    #[test]
    fn empty_include_list_falls_through_to_exclude() {
        let filter = DomainFilter::from_lists(Some(vec![]), Some(vec!["reddit.com".to_string()]));
        assert_eq!(filter, DomainFilter::Exclude(vec!["reddit.com".to_string()]));
    }

    #[test]
    fn topic_parses_lowercase_tags() {
        let topics: Vec<Topic> = serde_json::from_str(r#"["news","finance","general"]"#).unwrap();
        assert_eq!(topics, vec![Topic::News, Topic::Finance, Topic::General]);
    }
}
