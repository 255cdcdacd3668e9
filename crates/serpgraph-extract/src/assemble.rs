//! Assembly of an `Extraction` into the persisted `SerpPage` shape.
//!
//! Suggestion-bearing categories (related searches, disambiguation box, the
//! knowledge-panel lists) are flattened into joined columns; every other
//! category contributes `SerpRecord` rows with derived link facts.

use serpgraph_core::{KnowledgePanel, SerpPage, SerpRecord, LIST_SEPARATOR};
use url::Url;

use crate::engine::{ExtractedRecord, Extraction};

const SOCIAL_HOSTS: &[&str] = &[
    "www.facebook.com",
    "twitter.com",
    "www.linkedin.com",
    "www.pinterest.com",
    "plus.google.com",
    "www.tumblr.com",
    "instagram.com",
    "vk.com",
    "www.flickr.com",
    "vine.co",
    "www.meetup.com",
    "www.tagged.com",
    "ask.fm",
    "www.meetme.com",
    "www.classmates.com",
];

/// Categories whose rows carry an optional image thumbnail; absence there
/// means `Some(false)` rather than "not applicable".
const IMAGE_THUMBNAIL_CATEGORIES: &[&str] = &[
    "organic_results",
    "news_results",
    "in_depth_articles",
    "shopping_results_left",
    "shopping_results_right",
    "local_carousel",
    "list_carousel",
];

pub fn assemble(
    source: &str,
    query: &str,
    extraction: &Extraction,
    autocomplete: &[String],
) -> SerpPage {
    let mut page = SerpPage::empty(source, query);
    let signals = &extraction.signals;

    page.page_number = signals.page_number;
    page.num_results_for_query = signals.num_results_for_query.clone();
    page.num_results = signals.num_results;
    page.effective_query = signals.effective_query.clone();
    page.no_results = signals.no_results;
    // One autocorrect value, two meanings: the forced-check marker tells the
    // two apart, and exactly one of the columns is populated.
    if signals.autocorrect_forced_check.is_some() {
        page.autocorrect_forced = signals.autocorrect.clone();
    } else {
        page.autocorrect_suggested = signals.autocorrect.clone();
    }
    page.map_result = signals.map_result;
    page.image_results = signals.image_results;
    page.image_mega_block = signals.image_mega_block;
    page.answer_box = signals.answer_box;
    page.knowledge_graph_box = signals.knowledge_graph.box_present;
    page.autocomplete_results = join_nonempty(autocomplete.to_vec());

    let mut related_searches = Vec::new();
    let mut disambiguation = Vec::new();
    let mut trivia = Vec::new();
    let mut social_profiles = Vec::new();
    let mut reviews = Vec::new();
    let mut features = Vec::new();
    let mut people_also_search_for = Vec::new();
    let mut slideshows = Vec::new();

    for (category, records) in &extraction.categories {
        for record in records {
            match category.as_str() {
                "related_searches" => {
                    if let Some(keyword) = record.field("keyword") {
                        related_searches.push(keyword.to_string());
                    }
                }
                "disambiguation_box" => {
                    if let Some(entry) = disambiguation_entry(record) {
                        disambiguation.push(entry);
                    }
                }
                "knowledge_graph_trivia" => {
                    if let Some(entry) = trivia_entry(record) {
                        trivia.push(entry);
                    }
                }
                "knowledge_graph_social_profiles" => {
                    if let Some(profile) = record.field("profile") {
                        social_profiles.push(profile.to_string());
                    }
                }
                "knowledge_graph_reviews" => {
                    if let Some(review) = record.field("review") {
                        reviews.push(review.to_string());
                    }
                }
                "knowledge_graph_features" => {
                    if let (Some(institution), Some(feature)) =
                        (record.field("institution"), record.field("feature"))
                    {
                        features.push(format!("{institution}: {feature}"));
                    }
                }
                "knowledge_graph_people_also_search_for" => {
                    if let Some(keyword) = record.field("keyword") {
                        people_also_search_for.push(keyword.to_string());
                    }
                }
                "knowledge_graph_slideshows" => {
                    if let Some(slideshow) = record.field("slideshow") {
                        slideshows.push(slideshow.to_string());
                    }
                }
                _ => page.records.push(build_record(category, record)),
            }
        }
    }

    page.related_searches = join_nonempty(related_searches);
    page.disambiguation_results = join_nonempty(disambiguation);

    if signals.knowledge_graph.box_present {
        let kg = &signals.knowledge_graph;
        page.knowledge_panel = Some(KnowledgePanel {
            title: kg.title.clone(),
            subtitle: kg.subtitle.clone().or_else(|| kg.location_subtitle.clone()),
            snippet: kg.snippet.clone().or_else(|| kg.location_snippet.clone()),
            star_rating: kg.star_rating.clone().or_else(|| kg.star_rating_big.clone()),
            star_rating_reviews: kg
                .star_rating_reviews
                .clone()
                .or_else(|| kg.star_rating_reviews_big.clone()),
            reviews: join_nonempty(reviews),
            trivia: join_nonempty(trivia),
            social_profiles: join_nonempty(social_profiles),
            recent_post: kg.recent_post.clone(),
            features: join_nonempty(features),
            people_also_search_for: join_nonempty(people_also_search_for),
            map: kg.map,
            thumbnail: kg.thumbnail,
            slideshows: join_nonempty(slideshows),
            images_scrapbook: kg.images_scrapbook,
        });
    }

    page
}

fn join_nonempty(values: Vec<String>) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(LIST_SEPARATOR))
    }
}

fn build_record(category: &str, record: &ExtractedRecord) -> SerpRecord {
    let link = record.field("link").unwrap_or_default().to_string();
    let domain = Url::parse(&link)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));

    let star_rating = match (category, record.field("star_rating")) {
        ("paid_results", Some(rating)) => Some(rating.to_string()),
        ("organic_results" | "local_pack_results" | "list_carousel", Some(rating)) => {
            Some(match record.field("star_rating_reviews") {
                Some(reviews) => format!("{rating} - {reviews}"),
                None => rating.to_string(),
            })
        }
        _ => None,
    };

    let address = match (category, record.field("address"), record.field("phone_number")) {
        ("paid_results", Some(address), Some(phone)) => Some(format!("{address} {phone}")),
        (_, address, _) => address.map(str::to_string),
    };

    let search_bar = if record.field("search_bar").is_some() {
        Some(true)
    } else if category == "organic_results" {
        Some(false)
    } else {
        None
    };

    let image_thumbnail = if record.field("image_thumbnail").is_some() {
        Some(true)
    } else if IMAGE_THUMBNAIL_CATEGORIES.contains(&category) {
        Some(false)
    } else {
        None
    };

    let video_thumbnail = if record.field("video_thumbnail").is_some() {
        Some(true)
    } else if category == "organic_results" {
        Some(false)
    } else {
        None
    };

    let small_sitelinks = join_nonempty(
        (1..=6)
            .filter_map(|i| record.field(&format!("small_sitelink_{i}")))
            .map(str::to_string)
            .collect(),
    );
    let big_sitelinks = join_nonempty(
        (1..=6)
            .filter_map(|i| {
                let name = record.field(&format!("big_sitelink_{i}"))?;
                Some(match record.field(&format!("big_sitelink_{i}_description")) {
                    Some(description) => format!("{name} - {description}"),
                    None => name.to_string(),
                })
            })
            .collect(),
    );

    SerpRecord {
        category: category.to_string(),
        rank: record.rank,
        social_site: domain
            .as_deref()
            .is_some_and(|d| SOCIAL_HOSTS.contains(&d)),
        https: link.starts_with("https"),
        m_dot: link.contains("//m."),
        link,
        title: record.field("title").map(str::to_string),
        snippet: record.field("snippet").map(str::to_string),
        visible_link: record.field("visible_link").map(str::to_string),
        domain,
        star_rating,
        address,
        search_bar,
        schema_enhanced_listing: record
            .non_empty("schema_enhanced_listing")
            .map(str::to_string),
        image_thumbnail,
        video_thumbnail,
        small_sitelinks,
        big_sitelinks,
        price: record.field("price").map(str::to_string),
    }
}

fn disambiguation_entry(record: &ExtractedRecord) -> Option<String> {
    let keyword = record.field("keyword")?;
    if let Some(snippet) = record.field("snippet") {
        return Some(format!("{keyword} - {snippet}"));
    }
    if let (Some(a), Some(b), Some(c), Some(d)) = (
        record.field("snippet_0_0"),
        record.field("snippet_0_1"),
        record.field("snippet_1_0"),
        record.field("snippet_1_1"),
    ) {
        return Some(format!("{keyword} - {a}{b} {c}{d}"));
    }
    Some(keyword.to_string())
}

fn trivia_entry(record: &ExtractedRecord) -> Option<String> {
    if let Some(hours_title) = record.field("hours_title") {
        let status = record
            .field("hours_status")
            .or_else(|| record.field("hours_status_grayscale"));
        let mut pieces = vec![hours_title];
        match (record.field("hours_morning"), record.field("hours_afternoon")) {
            (None, None) => pieces.extend(status),
            (morning, Some(afternoon)) if morning == Some(afternoon) => {
                pieces.extend(record.field("hours_status"));
                pieces.push(afternoon);
            }
            (morning, afternoon) => {
                pieces.extend(record.field("hours_status"));
                pieces.extend(morning);
                pieces.extend(afternoon);
            }
        }
        return Some(pieces.join(" "));
    }
    let title = record.field("title").or_else(|| record.field("link_title"))?;
    let fact = record.field("fact").or_else(|| record.field("link_fact"));
    Some(match fact {
        Some(fact) => format!("{title} {fact}"),
        None => title.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Extraction, PageSignals};
    use std::collections::BTreeMap;

    fn record(rank: u32, fields: &[(&str, &str)]) -> ExtractedRecord {
        ExtractedRecord {
            rank,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn extraction_with(category: &str, records: Vec<ExtractedRecord>) -> Extraction {
        let mut categories = BTreeMap::new();
        categories.insert(category.to_string(), records);
        Extraction {
            categories,
            signals: PageSignals::default(),
        }
    }

    #[test]
    fn organic_star_rating_composes_with_reviews() {
        let ex = extraction_with(
            "organic_results",
            vec![record(
                1,
                &[
                    ("link", "https://example.com/"),
                    ("star_rating", "4.5"),
                    ("star_rating_reviews", "120 reviews"),
                ],
            )],
        );
        let page = assemble("google", "q", &ex, &[]);
        assert_eq!(page.records[0].star_rating.as_deref(), Some("4.5 - 120 reviews"));
    }

    #[test]
    fn paid_star_rating_stays_bare_and_address_gains_phone() {
        let ex = extraction_with(
            "paid_results",
            vec![record(
                1,
                &[
                    ("link", "https://ads.example/"),
                    ("star_rating", "4.1"),
                    ("address", "1 Main St"),
                    ("phone_number", "555-0100"),
                ],
            )],
        );
        let page = assemble("google", "q", &ex, &[]);
        assert_eq!(page.records[0].star_rating.as_deref(), Some("4.1"));
        assert_eq!(page.records[0].address.as_deref(), Some("1 Main St 555-0100"));
    }

    #[test]
    fn link_facts_are_derived_from_the_url() {
        let ex = extraction_with(
            "organic_results",
            vec![
                record(1, &[("link", "https://twitter.com/someone")]),
                record(2, &[("link", "http://example.com/a//m.page")]),
            ],
        );
        let page = assemble("google", "q", &ex, &[]);
        let first = &page.records[0];
        assert!(first.social_site);
        assert!(first.https);
        assert!(!first.m_dot);
        assert_eq!(first.domain.as_deref(), Some("twitter.com"));
        let second = &page.records[1];
        assert!(!second.social_site);
        assert!(!second.https);
        assert!(second.m_dot);
    }

    #[test]
    fn thumbnail_columns_are_tri_state() {
        let ex = extraction_with(
            "news_results",
            vec![record(1, &[("link", "https://example.com/")])],
        );
        let page = assemble("google", "q", &ex, &[]);
        assert_eq!(page.records[0].image_thumbnail, Some(false));
        assert_eq!(page.records[0].video_thumbnail, None);
        assert_eq!(page.records[0].search_bar, None);

        let ex = extraction_with(
            "results",
            vec![record(1, &[("link", "https://example.com/")])],
        );
        let page = assemble("bing", "q", &ex, &[]);
        assert_eq!(page.records[0].image_thumbnail, None);
    }

    #[test]
    fn sitelinks_join_in_order() {
        let ex = extraction_with(
            "organic_results",
            vec![record(
                1,
                &[
                    ("link", "https://example.com/"),
                    ("small_sitelink_1", "About"),
                    ("small_sitelink_3", "Careers"),
                    ("big_sitelink_1", "Docs"),
                    ("big_sitelink_1_description", "API reference"),
                ],
            )],
        );
        let page = assemble("google", "q", &ex, &[]);
        assert_eq!(
            page.records[0].small_sitelinks.as_deref(),
            Some("About; Careers")
        );
        assert_eq!(
            page.records[0].big_sitelinks.as_deref(),
            Some("Docs - API reference")
        );
    }

    #[test]
    fn disambiguation_entries_prefer_the_flat_snippet() {
        let flat = record(1, &[("keyword", "jaguar"), ("snippet", "the cat")]);
        assert_eq!(disambiguation_entry(&flat).as_deref(), Some("jaguar - the cat"));

        let quadrant = record(
            2,
            &[
                ("keyword", "jaguar"),
                ("snippet_0_0", "Brit"),
                ("snippet_0_1", "ish"),
                ("snippet_1_0", "car "),
                ("snippet_1_1", "maker"),
            ],
        );
        assert_eq!(
            disambiguation_entry(&quadrant).as_deref(),
            Some("jaguar - British car maker")
        );

        let bare = record(3, &[("keyword", "jaguar")]);
        assert_eq!(disambiguation_entry(&bare).as_deref(), Some("jaguar"));
    }

    #[test]
    fn trivia_entries_cover_hours_and_facts() {
        let open = record(
            1,
            &[
                ("hours_title", "Hours:"),
                ("hours_status", "Open today"),
                ("hours_morning", "9am-12"),
                ("hours_afternoon", "1pm-6pm"),
            ],
        );
        assert_eq!(
            trivia_entry(&open).as_deref(),
            Some("Hours: Open today 9am-12 1pm-6pm")
        );

        let closed = record(2, &[("hours_title", "Hours:"), ("hours_status", "Closed")]);
        assert_eq!(trivia_entry(&closed).as_deref(), Some("Hours: Closed"));

        let fact = record(3, &[("title", "Founded"), ("fact", "1998")]);
        assert_eq!(trivia_entry(&fact).as_deref(), Some("Founded 1998"));
    }

    #[test]
    fn panel_is_built_only_when_the_box_signal_fired() {
        let mut ex = extraction_with(
            "knowledge_graph_social_profiles",
            vec![record(1, &[("profile", "Twitter"), ("link", "https://t.example/")])],
        );
        let page = assemble("google", "q", &ex, &[]);
        assert!(page.knowledge_panel.is_none());

        ex.signals.knowledge_graph.box_present = true;
        ex.signals.knowledge_graph.title = Some("Acme Corp".to_string());
        let page = assemble("google", "q", &ex, &[]);
        let panel = page.knowledge_panel.unwrap();
        assert_eq!(panel.title.as_deref(), Some("Acme Corp"));
        assert_eq!(panel.social_profiles.as_deref(), Some("Twitter"));
    }

    #[test]
    fn autocorrect_lands_in_exactly_one_column() {
        let mut ex = extraction_with("organic_results", Vec::new());
        ex.signals.autocorrect = Some("corrected".to_string());
        let page = assemble("google", "q", &ex, &[]);
        assert_eq!(page.autocorrect_suggested.as_deref(), Some("corrected"));
        assert!(page.autocorrect_forced.is_none());

        ex.signals.autocorrect_forced_check = Some("original".to_string());
        let page = assemble("google", "q", &ex, &[]);
        assert_eq!(page.autocorrect_forced.as_deref(), Some("corrected"));
        assert!(page.autocorrect_suggested.is_none());
    }

    #[test]
    fn effective_query_does_not_imply_no_results() {
        let mut ex = extraction_with(
            "organic_results",
            vec![record(1, &[("link", "https://example.com/")])],
        );
        ex.signals.effective_query = Some("corrected query".to_string());
        ex.signals.num_results = 1;
        let page = assemble("google", "q", &ex, &[]);
        assert_eq!(page.effective_query.as_deref(), Some("corrected query"));
        assert!(!page.no_results);
        assert_eq!(page.num_results, 1);
    }

    #[test]
    fn autocomplete_terms_are_joined() {
        let ex = extraction_with("organic_results", Vec::new());
        let page = assemble(
            "google",
            "q",
            &ex,
            &["q one".to_string(), "q two".to_string()],
        );
        assert_eq!(page.autocomplete_results.as_deref(), Some("q one; q two"));
        let page = assemble("google", "q", &ex, &[]);
        assert!(page.autocomplete_results.is_none());
    }
}
