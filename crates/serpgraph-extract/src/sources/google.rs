//! Google catalogue: by far the richest layout the extractor reads.
//!
//! Result links arrive wrapped in a `/url?q=...&sa=U&ei=...` redirect; the
//! post-parse hook unwraps and percent-decodes them, then applies the
//! no-results heuristics (banner text, zero kept rows, snippet rescue).

use percent_encoding::percent_decode_str;
use serpgraph_core::Result;

use crate::engine::Extraction;
use crate::schema::{PageSelectors, ResultSchema, VariantSchema};
use crate::selector::compile_all;
use crate::sources::{Source, SourceKind};

/// Regional layout variants. The two catalogues are identical today; the
/// split keeps room for regional drift without touching call sites.
const VARIANTS: &[&str] = &["us_ip", "de_ip"];

pub(super) fn source() -> Result<Source> {
    Ok(Source::new(
        SourceKind::Google,
        "google",
        "us_ip",
        page_selectors()?,
        schema()?,
    ))
}

fn page_selectors() -> Result<PageSelectors> {
    Ok(PageSelectors {
        num_results_for_query: compile_all(&["#resultStats::text"])?,
        page_number: compile_all(&["#navcnt td.cur::text"])?,
        effective_query: compile_all(&["#topstuff .med > b::text"])?,
        autocorrect: compile_all(&["div.med a.spell::text"])?,
        autocorrect_forced_check: compile_all(&["div.med a.spell_orig::text"])?,
        map_result: compile_all(&["div._LPe.rhsvw._CC"])?,
        image_results: compile_all(&["#imagebox_bigimages"])?,
        image_mega_block: compile_all(&["ul.rg_ul > li._ZGc.bili.uh_r.rg_el:nth-child(9)"])?,
        // Single-answer box or the multi-row container; either counts.
        answer_box: compile_all(&["#center_col li.g.mnr-c.g-blk", "div.rl_container"])?,
        knowledge_graph_box: compile_all(&["#rhs li.g.mnr-c.rhsvw.g-blk"])?,
        knowledge_graph_title: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div.kno-ecr-pt.kno-fb-ctx::text",
        ])?,
        knowledge_graph_star_rating: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div._j3d span.rtng::text",
        ])?,
        knowledge_graph_star_rating_reviews: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div._j3d a.fl::text",
        ])?,
        knowledge_graph_star_rating_big: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div._i3d span.rtng::text",
        ])?,
        knowledge_graph_star_rating_reviews_big: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div._i3d a.fl::text",
        ])?,
        knowledge_graph_subtitle: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div._gdf.kno-fb-ctx::text",
        ])?,
        knowledge_graph_location_subtitle: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div._mr._Wfc.vk_gy::text",
        ])?,
        knowledge_graph_snippet: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div.kno-rdesc > span:first-child::text",
        ])?,
        knowledge_graph_location_snippet: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk span._N1d::text",
        ])?,
        knowledge_graph_recent_post: compile_all(&[
            "#rhs li.g.mnr-c.rhsvw.g-blk div._b4 div.s > div:last-child::text",
        ])?,
        knowledge_graph_map: compile_all(&["#rhs li.g.mnr-c.rhsvw.g-blk #lu_map"])?,
        knowledge_graph_thumbnail: compile_all(&["#rhs li.g.mnr-c.rhsvw.g-blk img.iuth"])?,
        knowledge_graph_images_scrapbook: compile_all(&["#rhs li.g.mnr-c.rhsvw.g-blk div._iH"])?,
        ..PageSelectors::default()
    })
}

const ORGANIC_FIELDS: &[(&str, &str)] = &[
    ("link", "h3.r > a:first-child::attr(href)"),
    ("snippet", "div.s span.st::text"),
    ("title", "h3.r > a:first-child::text"),
    ("visible_link", "cite::text"),
    ("star_rating", "#lclbox span.rtng::text"),
    ("star_rating_reviews", "#lclbox > a.fl > span::text"),
    ("address", "#lclbox table.ts.intrlu > tbody > tr > td:last-child::text"),
    ("search_bar", "#nqsbq"),
    ("schema_enhanced_listing", "div.s div.f.slp::text"),
    ("image_thumbnail", "div.s div.th._lyb"),
    ("video_thumbnail", "div.s div.th._lyb._YQd"),
    ("small_sitelink_1", "div.osl > a.fl:nth-child(1)::text"),
    ("small_sitelink_2", "div.osl > a.fl:nth-child(2)::text"),
    ("small_sitelink_3", "div.osl > a.fl:nth-child(3)::text"),
    ("small_sitelink_4", "div.osl > a.fl:nth-child(4)::text"),
    ("small_sitelink_5", "div.osl > a.fl:nth-child(5)::text"),
    ("small_sitelink_6", "div.osl > a.fl:nth-child(6)::text"),
    ("big_sitelink_1", "tbody > tr.mslg._Amc > td:first-child h3.r > a.l::text"),
    ("big_sitelink_1_description", "tbody > tr.mslg._Amc > td:first-child div.st::text"),
    ("big_sitelink_2", "tbody > tr.mslg._Amc > td:last-child h3.r > a.l::text"),
    ("big_sitelink_2_description", "tbody > tr.mslg._Amc > td:last-child div.st::text"),
    ("big_sitelink_3", "tbody > tr.mslg._Amc + tr.mslg > td:first-child h3.r > a.l::text"),
    ("big_sitelink_3_description", "tbody > tr.mslg._Amc + tr.mslg > td:first-child div.st::text"),
    ("big_sitelink_4", "tbody > tr.mslg._Amc + tr.mslg > td:last-child h3.r > a.l::text"),
    ("big_sitelink_4_description", "tbody > tr.mslg._Amc + tr.mslg > td:last-child div.st::text"),
    ("big_sitelink_5", "tbody > tr.mslg._Amc + tr.mslg + tr.mslg > td:first-child h3.r > a.l::text"),
    ("big_sitelink_5_description", "tbody > tr.mslg._Amc + tr.mslg + tr.mslg > td:first-child div.st::text"),
    ("big_sitelink_6", "tbody > tr.mslg._Amc + tr.mslg + tr.mslg > td:last-child h3.r > a.l::text"),
    ("big_sitelink_6_description", "tbody > tr.mslg._Amc + tr.mslg + tr.mslg > td:last-child div.st::text"),
];

const PAID_FIELDS: &[(&str, &str)] = &[
    ("link", "h3 > a+a:first-child::attr(href)"),
    ("snippet", ".ads-creative::text"),
    ("title", "h3 > a+a:first-child::text"),
    ("visible_link", ".ads-visurl cite::text"),
    ("star_rating", "span._uEc::text"),
    ("address", "div._wnd > div._H2b:last-child > a._vnd::text"),
    ("phone_number", "div._wnd > div._H2b:last-child > div._K2b > span._xnd::text"),
    ("small_sitelink_1", "ul:last-child > li:nth-child(1) > a::text"),
    ("small_sitelink_2", "ul:last-child > li:nth-child(2) > a::text"),
    ("small_sitelink_3", "ul:last-child > li:nth-child(3) > a::text"),
    ("small_sitelink_4", "ul:last-child > li:nth-child(4) > a::text"),
    ("small_sitelink_5", "ul:last-child > li:nth-child(5) > a::text"),
    ("small_sitelink_6", "ul:last-child > li:nth-child(6) > a::text"),
    ("big_sitelink_1", "ul:last-child > li:nth-child(1) > h3 > a::text"),
    ("big_sitelink_1_description", "ul:last-child > li:nth-child(1) > div.ads-creative.ac::text"),
    ("big_sitelink_2", "ul:last-child > li:nth-child(2) > h3 > a::text"),
    ("big_sitelink_2_description", "ul:last-child > li:nth-child(2) > div.ads-creative.ac::text"),
    ("big_sitelink_3", "ul:last-child > li:nth-child(3) > h3 > a::text"),
    ("big_sitelink_3_description", "ul:last-child > li:nth-child(3) > div.ads-creative.ac::text"),
    ("big_sitelink_4", "ul:last-child > li:nth-child(4) > h3 > a::text"),
    ("big_sitelink_4_description", "ul:last-child > li:nth-child(4) > div.ads-creative.ac::text"),
    ("big_sitelink_5", "ul:last-child > li:nth-child(5) > h3 > a::text"),
    ("big_sitelink_5_description", "ul:last-child > li:nth-child(5) > div.ads-creative.ac::text"),
    ("big_sitelink_6", "ul:last-child > li:nth-child(6) > h3 > a::text"),
    ("big_sitelink_6_description", "ul:last-child > li:nth-child(6) > div.ads-creative.ac::text"),
];

fn schema() -> Result<ResultSchema> {
    let mut table = ResultSchema::new();

    table.insert_all(
        "organic_results",
        VARIANTS,
        VariantSchema::new(
            "#center_col",
            Some(
                "li.g:not(li.g.card-section):not(li.g.no-sep)\
                 :not(li#imagebox_bigimages.g):not(li.g.mnr-c.g-blk)",
            ),
            ORGANIC_FIELDS,
        )?,
    );

    table.insert_all(
        "paid_results",
        VARIANTS,
        VariantSchema::new("li.ads-ad", None, PAID_FIELDS)?,
    );

    table.insert_all(
        "shopping_results_left",
        VARIANTS,
        VariantSchema::new(
            "div.c.commercial-unit.commercial-unit-desktop-top",
            Some("div.pla-unit"),
            &[
                ("link", "div._vT > a:first-child::attr(href)"),
                ("title", "div._vT > a:first-child::text"),
                ("price", "div._QD::text"),
                ("image_thumbnail", "span._qYc"),
                ("visible_link", "div._mC > span.a::text"),
            ],
        )?,
    );

    table.insert_all(
        "shopping_results_right",
        VARIANTS,
        VariantSchema::new(
            "div.c.commercial-unit.commercial-unit-desktop-rhs.rhsvw",
            Some("div.pla-unit"),
            &[
                ("link", "div._vT > a:first-child::attr(href)"),
                ("title", "div._vT > a:first-child > span.rhsg4::text"),
                ("price", "div._QD::text"),
                ("image_thumbnail", "span._qYc"),
                ("visible_link", "div._mC > span.rhsg4.a::text"),
            ],
        )?,
    );

    table.insert_all(
        "news_results",
        VARIANTS,
        VariantSchema::new(
            "div.mnr-c._yE",
            Some("li.g"),
            &[
                ("link", "a._Dk::attr(href)"),
                ("snippet", "span._dwd.st.s.std::text"),
                ("title", "a._Dk::text"),
                ("image_thumbnail", "div._K2._SYd"),
                ("visible_link", "cite::text"),
            ],
        )?,
    );

    table.insert_all(
        "in_depth_articles",
        VARIANTS,
        VariantSchema::new(
            "#center_col",
            Some(
                "li.g.card-section:not(li.card-section._df.g._mZd)\
                 :not(li.g._Nn._wbb.card-section):not(li.g._Nn._Abb.card-section)",
            ),
            &[
                ("link", "h3.r > a:first-child::attr(href)"),
                ("snippet", "div.s span.st::text"),
                ("title", "h3.r > a:first-child::text"),
                ("image_thumbnail", "div.th._lyb"),
                ("visible_link", "cite::text"),
            ],
        )?,
    );

    table.insert_all(
        "local_carousel",
        VARIANTS,
        VariantSchema::new(
            "#extabar",
            Some("li"),
            &[
                ("link", "a:first-child::attr(href)"),
                ("title", "a:first-child::attr(title)"),
                ("image_thumbnail", "div.klic"),
            ],
        )?,
    );

    table.insert_all(
        "local_pack_results",
        VARIANTS,
        VariantSchema::new(
            "li.g.no-sep",
            Some("div.intrlu"),
            &[
                ("link", "h3.r > a:first-child::attr(href)"),
                ("title", "h3.r > a:first-child::text"),
                ("visible_link", "cite::text"),
                ("star_rating", "span.rtng::text"),
                ("star_rating_reviews", "a.fl::text"),
                ("address", "div.g > div:last-child::text"),
            ],
        )?,
    );

    table.insert_all(
        "list_carousel",
        VARIANTS,
        VariantSchema::new(
            "div._oL",
            Some("div._gt"),
            &[
                ("link", "a:first-child::attr(href)"),
                ("snippet", "span._ucf::text"),
                ("title", "div._rl::text"),
                ("star_rating", "span.rtng::text"),
                ("star_rating_reviews", "span._Mnc.vk_lt::text"),
                ("schema_enhanced_listing", "div._CRe > div::text"),
                ("price", "div._Nl::text"),
                ("image_thumbnail", "div._li"),
            ],
        )?,
    );

    table.insert_all(
        "related_searches",
        VARIANTS,
        VariantSchema::new(
            "#extrares",
            Some("p._e4b"),
            &[
                ("keyword", "a:first-child::text"),
                ("link", "a:first-child::attr(href)"),
            ],
        )?,
    );

    table.insert_all(
        "disambiguation_box",
        VARIANTS,
        VariantSchema::new(
            "div._OKe",
            Some("li.fwm._NXc._DJe.mod"),
            &[
                ("keyword", "div._Z3 > div._Qqb._tX.ellip::text"),
                ("link", "div.kno-fb-ctx > a:first-child::attr(href)"),
                ("snippet", "div._Z3 > div._Adb > span.rhsg4::text"),
                ("snippet_0_0", "div._Z3 > div._Adb > div._mr.ellip:first-child > span:first-child::text"),
                ("snippet_0_1", "div._Z3 > div._Adb > div._mr.ellip:first-child > span:last-child::text"),
                ("snippet_1_0", "div._Z3 > div._Adb > div._mr.ellip:last-child > span:first-child::text"),
                ("snippet_1_1", "div._Z3 > div._Adb > div._mr.ellip:last-child > span:last-child::text"),
            ],
        )?,
    );

    table.insert_all(
        "knowledge_graph_trivia",
        VARIANTS,
        VariantSchema::new(
            "div._mr",
            None,
            &[
                ("title", "span:first-child::text"),
                ("link_title", "a.fl:first-child::text"),
                ("fact", "span:last-child::text"),
                ("link_fact", "a.fl:last-child::text"),
                ("hours_title", "div.lud-hourslabel::text"),
                ("hours_status", "span._CK::text"),
                ("hours_status_grayscale", "span._bC::text"),
                ("hours_morning", "a.fl > span:first-child::text"),
                ("hours_afternoon", "a.fl > span:last-child::text"),
                ("link", "a.fl::attr(href)"),
            ],
        )?,
    );

    table.insert_all(
        "knowledge_graph_social_profiles",
        VARIANTS,
        VariantSchema::new(
            "ul._Ugf",
            Some("li.kno-vrt-t.kno-fb-ctx"),
            &[
                ("profile", "a.fl::text"),
                ("link", "a.fl::attr(href)"),
            ],
        )?,
    );

    table.insert_all(
        "knowledge_graph_reviews",
        VARIANTS,
        VariantSchema::new(
            "div._PJb",
            None,
            &[
                ("review", "div._RJb::text"),
                ("link", "img._NJb::attr(src)"),
            ],
        )?,
    );

    table.insert_all(
        "knowledge_graph_features",
        VARIANTS,
        VariantSchema::new(
            "#rhs li.g.mnr-c.rhsvw.g-blk",
            None,
            &[
                ("institution", "span._mP::text"),
                ("feature", "#pl_ffl > a.fl::text"),
                ("link", "#pl_ffl > a.fl::attr(href)"),
            ],
        )?,
    );

    table.insert_all(
        "knowledge_graph_people_also_search_for",
        VARIANTS,
        VariantSchema::new(
            "div._c4",
            Some("div.kno-fb-ctx.kno-vrt-t"),
            &[
                ("keyword", "a.fl.ellip._Wqb::text"),
                ("link", "a.fl.ellip._Wqb::attr(href)"),
            ],
        )?,
    );

    table.insert_all(
        "knowledge_graph_slideshows",
        VARIANTS,
        VariantSchema::new(
            "#rhs li.g.mnr-c.rhsvw.g-blk",
            Some("div.thumb"),
            &[
                ("slideshow", "span.cptn::text"),
                ("link", "a::attr(href)"),
            ],
        )?,
    );

    Ok(table)
}

pub(super) fn after_parsing(extraction: &mut Extraction, html: &str, query: &str) {
    let signals = &mut extraction.signals;
    signals.no_results = signals.num_results == 0;
    if html.contains("No results found for") || html.contains("did not match any documents") {
        signals.no_results = true;
    }

    // The banner can fire even when results are present; a snippet that quotes
    // the query back verbatim overrides it.
    if extraction.signals.no_results && !query.is_empty() {
        let needle = query.replace('"', "");
        let quoted_back = extraction
            .linked_records()
            .any(|(_, record)| record.field("snippet").is_some_and(|s| s.contains(&needle)));
        if quoted_back {
            extraction.signals.no_results = false;
        }
    }

    extraction.rewrite_links(unwrap_redirect);
}

/// Extract and decode the target of a `/url?q=<target>&sa=U&ei=...` wrapper.
/// Links in any other shape are left alone.
fn unwrap_redirect(link: &str) -> Option<String> {
    let start = link.find("/url?q=")? + "/url?q=".len();
    let rest = &link[start..];
    let end = rest.find("&sa=U&ei=")?;
    Some(
        percent_decode_str(&rest[..end])
            .decode_utf8_lossy()
            .into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_document;
    use crate::engine::extract;

    fn organic_row(href: &str, title: &str, snippet: &str) -> String {
        format!(
            "<li class=\"g\"><h3 class=\"r\"><a href=\"{href}\">{title}</a></h3>\
             <div class=\"s\"><span class=\"st\">{snippet}</span></div>\
             <cite>example.com</cite></li>"
        )
    }

    fn serp(body: &str) -> String {
        format!("<html><body>{body}</body></html>")
    }

    fn run(html: &str, query: &str) -> Extraction {
        let src = source().unwrap();
        let doc = parse_document(html).unwrap();
        let mut ex = extract(&doc, src.page_selectors(), src.schema(), "us_ip").unwrap();
        src.after_parsing(&mut ex, html, query);
        ex
    }

    #[test]
    fn unwraps_percent_encoded_redirects() {
        assert_eq!(
            unwrap_redirect(
                "/url?q=http%3A%2F%2Fwww.youtube.com%2Fuser%2FApple&sa=U&ei=lntiVN7J&ved=0CFQ"
            ),
            Some("http://www.youtube.com/user/Apple".to_string())
        );
        assert_eq!(unwrap_redirect("https://example.com/"), None);
    }

    #[test]
    fn organic_rows_come_back_with_clean_links() {
        let html = serp(&format!(
            "<div id=\"center_col\">{}</div>",
            organic_row(
                "/url?q=https%3A%2F%2Fexample.com%2Fa&sa=U&ei=x",
                "Example",
                "a snippet"
            )
        ));
        let ex = run(&html, "example");
        let organic = &ex.categories["organic_results"];
        assert_eq!(organic[0].field("link"), Some("https://example.com/a"));
        assert_eq!(organic[0].field("title"), Some("Example"));
        assert!(!ex.signals.no_results);
    }

    #[test]
    fn banner_text_marks_no_results() {
        let html = serp(
            "<div id=\"center_col\"></div>\
             <p>Your search did not match any documents.</p>",
        );
        let ex = run(&html, "example");
        assert!(ex.signals.no_results);
    }

    #[test]
    fn snippet_quoting_the_query_rescues_the_page() {
        let html = serp(&format!(
            "<div id=\"center_col\">{}</div><p>No results found for something.</p>",
            organic_row("https://example.com/a", "t", "all about frobnication here")
        ));
        let ex = run(&html, "\"frobnication\"");
        assert!(!ex.signals.no_results);
    }

    #[test]
    fn autocorrect_and_forced_check_resolve_independently() {
        let html = serp(
            "<div class=\"med\"><a class=\"spell\">corrected term</a>\
             <a class=\"spell_orig\">original term</a></div>\
             <div id=\"center_col\"></div>",
        );
        let ex = run(&html, "");
        assert_eq!(ex.signals.autocorrect.as_deref(), Some("corrected term"));
        assert_eq!(
            ex.signals.autocorrect_forced_check.as_deref(),
            Some("original term")
        );
    }

    #[test]
    fn empty_spell_orig_leaves_the_correction_suggested() {
        let html = serp(
            "<div class=\"med\"><a class=\"spell\">corrected term</a>\
             <a class=\"spell_orig\"></a></div>\
             <div id=\"center_col\"></div>",
        );
        let ex = run(&html, "");
        assert_eq!(ex.signals.autocorrect.as_deref(), Some("corrected term"));
        assert!(ex.signals.autocorrect_forced_check.is_none());

        let page = crate::assemble::assemble("google", "q", &ex, &[]);
        assert_eq!(page.autocorrect_suggested.as_deref(), Some("corrected term"));
        assert!(page.autocorrect_forced.is_none());
    }

    #[test]
    fn related_searches_rows_carry_keywords() {
        let html = serp(
            "<div id=\"center_col\"></div>\
             <div id=\"extrares\">\
             <p class=\"_e4b\"><a href=\"/search?q=a\">alpha beta</a></p>\
             <p class=\"_e4b\"><a href=\"/search?q=b\">gamma</a></p>\
             </div>",
        );
        let ex = run(&html, "");
        let related = &ex.categories["related_searches"];
        assert_eq!(related.len(), 2);
        assert_eq!(related[0].field("keyword"), Some("alpha beta"));
        assert_eq!(related[1].field("keyword"), Some("gamma"));
    }
}
