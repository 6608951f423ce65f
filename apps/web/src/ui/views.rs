//! Pure view functions: data in, element tree out.
//!
//! Nothing here touches a `Document`. Interactive controls carry
//! `data-action` attributes; close controls carry `data-dismiss` with the
//! node id they remove.

use crate::matching_client::types::{CoverLetter, CvAnalysis, JobMatch, OptimizedCv};
use crate::models::job::JobPosting;
use crate::models::user::{Plan, UserProfile};
use crate::platform::provinces::PROVINCES;
use crate::ui::dom::{Element, Node, NodeId};
use crate::ui::overlay::NotificationKind;

/// Matching reasons shown per scanned job.
const MAX_MATCH_REASONS: usize = 3;

pub const JOBS_GRID_ID: &str = "jobsGrid";
pub const CITY_SELECT_ID: &str = "citySelect";
pub const PROVINCE_SELECT_ID: &str = "provinceSelect";
pub const REGISTRATION_MODAL_ID: &str = "registrationModal";
pub const PLAN_FIELD_ID: &str = "plan";
pub const HERO_CLASS: &str = "hero";

/// Landing page counters: (dom id, target, label).
pub const STAT_COUNTERS: &[(&str, u32, &str)] = &[
    ("statJobs", 12_500, "Active Jobs"),
    ("statPlacements", 8_400, "Successful Placements"),
    ("statEmployers", 1_200, "Partner Employers"),
];

fn icon(name: &str) -> Element {
    Element::new("i").class(&format!("fas fa-{name}"))
}

fn button(class: &str, action: &str, icon_name: Option<&str>, label: &str) -> Element {
    let mut btn = Element::new("button")
        .class(class)
        .attr("data-action", action);
    if let Some(name) = icon_name {
        btn = btn.child(icon(name));
    }
    btn.text(label)
}

fn close_control(tag: &'static str, class: &str, id: NodeId) -> Element {
    let mut el = Element::new(tag).attr("data-dismiss", id.to_string());
    if !class.is_empty() {
        el = el.class(class);
    }
    el.text("\u{00d7}")
}

// ────────────────────────────────────────────────────────────────────────────
// Landing page
// ────────────────────────────────────────────────────────────────────────────

pub fn landing_page(jobs: &[JobPosting]) -> Vec<Element> {
    vec![
        header(),
        hero(),
        search_panel(),
        Element::new("section")
            .id("jobs")
            .class("jobs-section")
            .child(Element::new("h2").text("Latest Opportunities"))
            .child(Element::new("div").id(JOBS_GRID_ID).class("jobs-grid").children(job_cards(jobs))),
        cv_panel(),
        pricing(),
        registration_modal(),
        Element::new("footer")
            .id("footer")
            .child(Element::new("p").text("JobConnect SA: connecting South African talent")),
    ]
}

fn header() -> Element {
    Element::new("header").id("header").child(
        Element::new("nav")
            .child(Element::new("span").class("logo").text("JobConnect SA"))
            .child(button("btn btn-primary", "show-registration", None, "Sign Up")),
    )
}

fn hero() -> Element {
    let stats = STAT_COUNTERS.iter().map(|(id, target, label)| {
        Element::new("div")
            .class("stat")
            .child(
                Element::new("span")
                    .id(*id)
                    .class("stat-number")
                    .attr("data-count", target.to_string())
                    .text("0"),
            )
            .child(Element::new("span").class("stat-label").text(*label))
    });

    Element::new("section")
        .class(HERO_CLASS)
        .child(Element::new("h1").text("Find Your Dream Job with AI"))
        .child(Element::new("div").class("hero-stats").children(stats))
}

fn search_panel() -> Element {
    let provinces = PROVINCES.iter().map(|p| {
        Element::new("option")
            .attr("value", p.key)
            .text(p.name)
    });

    Element::new("section")
        .id("search")
        .class("job-search")
        .child(
            Element::new("select")
                .id(PROVINCE_SELECT_ID)
                .child(Element::new("option").attr("value", "").text("All Provinces"))
                .children(provinces),
        )
        .child(
            Element::new("select")
                .id(CITY_SELECT_ID)
                .children(city_options(&[])),
        )
        .child(
            Element::new("input")
                .id("salaryRange")
                .attr("type", "number")
                .attr("min", "0"),
        )
        .child(button("btn btn-primary", "search-jobs", Some("search"), "Search Jobs"))
}

fn cv_panel() -> Element {
    Element::new("section")
        .id("cv-tools")
        .class("ai-tools")
        .child(Element::new("h2").text("AI CV Tools"))
        .child(
            Element::new("input")
                .id("cvUpload")
                .attr("type", "file")
                .attr("accept", ".pdf,.doc,.docx"),
        )
        .child(Element::new("input").id("targetIndustry").attr("type", "text"))
        .child(Element::new("input").id("experienceLevel").attr("type", "text"))
}

fn pricing() -> Element {
    let plans = [Plan::Basic, Plan::Premium, Plan::Enterprise].into_iter().map(|plan| {
        Element::new("div")
            .class("pricing-card")
            .child(Element::new("h3").text(plan.as_str()))
            .child(button(
                "btn btn-primary",
                &format!("select-plan:{plan}"),
                None,
                "Choose Plan",
            ))
    });
    Element::new("section")
        .id("pricing")
        .class("pricing")
        .children(plans)
}

fn registration_modal() -> Element {
    let field = |id: &'static str, kind: &str, label: &str| {
        Element::new("label")
            .text(label)
            .child(Element::new("input").id(id).attr("type", kind).attr("name", id))
    };

    let province_options = PROVINCES
        .iter()
        .map(|p| Element::new("option").attr("value", p.key).text(p.name));

    Element::new("div")
        .id(REGISTRATION_MODAL_ID)
        .class("modal")
        .attr("style", "display: none")
        // Clicks on the backdrop close the modal too.
        .attr("data-backdrop-action", "close-registration")
        .child(
            Element::new("span")
                .class("close")
                .attr("data-action", "close-registration")
                .text("\u{00d7}"),
        )
        .child(
            Element::new("form")
                .id("registrationForm")
                .child(field("fullName", "text", "Full Name"))
                .child(field("email", "email", "Email"))
                .child(field("phone", "tel", "Phone"))
                .child(Element::new("select").id("province").children(province_options))
                .child(field(PLAN_FIELD_ID, "hidden", ""))
                .child(
                    Element::new("button")
                        .class("btn btn-primary")
                        .attr("type", "submit")
                        .text("Create Account"),
                ),
        )
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

pub fn job_card(job: &JobPosting) -> Element {
    let mut card = Element::new("div")
        .class("job-card")
        .attr("data-aos", "fade-up")
        .attr("data-job-id", job.id.to_string());
    if job.urgent {
        card = card.child(Element::new("div").class("card-badge").text("URGENT"));
    }
    card.child(Element::new("h3").text(&job.title))
        .child(Element::new("p").class("company").text(&job.company))
        .child(
            Element::new("p")
                .class("location")
                .child(icon("map-marker-alt"))
                .text(format!(" {}", job.location)),
        )
        .child(
            Element::new("p")
                .class("salary")
                .child(icon("money-bill-wave"))
                .text(format!(" {}/month", job.salary_text)),
        )
        .child(
            Element::new("p")
                .class("type")
                .child(icon("clock"))
                .text(format!(" {}", job.employment_type)),
        )
        .child(Element::new("p").class("description").text(&job.description))
        .child(
            Element::new("div")
                .class("job-actions")
                .child(button(
                    "btn btn-primary",
                    &format!("apply:{}", job.id),
                    Some("paper-plane"),
                    "Apply Now",
                ))
                .child(button(
                    "btn btn-secondary",
                    &format!("save:{}", job.id),
                    Some("heart"),
                    "Save",
                )),
        )
        .child(Element::new("p").class("posted-time").text(&job.posted_ago))
}

pub fn job_cards(jobs: &[JobPosting]) -> Vec<Node> {
    jobs.iter().map(|j| Node::Element(job_card(j))).collect()
}

pub fn city_options(cities: &[&str]) -> Vec<Node> {
    let mut options = vec![Node::Element(
        Element::new("option").attr("value", "").text("All Cities"),
    )];
    options.extend(cities.iter().map(|city| {
        Node::Element(
            Element::new("option")
                .attr("value", city.to_lowercase())
                .text(*city),
        )
    }));
    options
}

// ────────────────────────────────────────────────────────────────────────────
// AI panels
// ────────────────────────────────────────────────────────────────────────────

pub fn cv_analysis(analysis: &CvAnalysis) -> Element {
    let improvements = analysis.improvements.iter().map(|imp| {
        let icon_name = if imp.is_high_priority() {
            "exclamation-triangle"
        } else {
            "info-circle"
        };
        Element::new("div")
            .class("improvement-item")
            .child(icon(icon_name).class(&imp.priority))
            .child(Element::new("span").text(&imp.message))
    });

    let keywords = analysis.keywords.iter().map(|kw| {
        let (class, mark) = if kw.matched {
            ("matched", "\u{2713}")
        } else {
            ("missing", "\u{2717}")
        };
        Element::new("span")
            .class("keyword-tag")
            .class(class)
            .text(format!("{} {}", kw.word, mark))
    });

    Element::new("div")
        .class("cv-analysis-results")
        .child(Element::new("h3").text("AI CV Analysis Results"))
        .child(
            Element::new("div").class("score-section").child(
                Element::new("div")
                    .class("overall-score")
                    .child(
                        Element::new("div")
                            .class("score-circle")
                            .attr("style", format!("--score: {}", analysis.overall_score))
                            .child(
                                Element::new("span").text(format!("{}%", analysis.overall_score)),
                            ),
                    )
                    .child(Element::new("p").text("Overall Optimization Score")),
            ),
        )
        .child(
            Element::new("div")
                .class("improvement-areas")
                .child(Element::new("h4").text("Key Improvement Areas"))
                .children(improvements),
        )
        .child(
            Element::new("div")
                .class("keyword-analysis")
                .child(Element::new("h4").text("Keyword Optimization"))
                .child(Element::new("div").class("keywords").children(keywords)),
        )
        .child(button(
            "btn btn-primary",
            "optimize-cv",
            Some("magic"),
            "Auto-Optimize CV",
        ))
}

fn stat(number: String, label: &str) -> Element {
    Element::new("div")
        .class("stat")
        .child(Element::new("span").class("number").text(number))
        .child(Element::new("span").text(label))
}

pub fn optimized_cv(data: &OptimizedCv) -> Element {
    Element::new("div")
        .class("optimized-cv")
        .child(Element::new("h3").text("AI-Optimized CV Ready!"))
        .child(
            Element::new("div")
                .class("improvement-stats")
                .child(stat(format!("+{}%", data.improvement_score), "Improvement"))
                .child(stat(format!("{}/100", data.ats_score), "ATS Score"))
                .child(stat(format!("{}/100", data.readability_score), "Readability")),
        )
        .child(
            Element::new("div")
                .class("cv-preview")
                .child(Element::new("h4").text("Preview"))
                .child(Element::new("div").class("preview-content").text(&data.preview)),
        )
        .child(
            Element::new("div")
                .class("action-buttons")
                .child(button(
                    "btn btn-primary",
                    "download-cv",
                    Some("download"),
                    "Download Optimized CV",
                ))
                .child(button(
                    "btn btn-secondary",
                    "apply-with-cv",
                    Some("paper-plane"),
                    "Apply to Matching Jobs",
                )),
        )
}

pub fn cover_letter(data: &CoverLetter) -> Element {
    Element::new("div")
        .class("cover-letter-result")
        .child(Element::new("h3").text("AI-Generated Cover Letter"))
        .child(
            Element::new("div")
                .class("quality-metrics")
                .child(
                    Element::new("span")
                        .class("metric")
                        .child(icon("bullseye"))
                        .text(format!(" Relevance: {}%", data.relevance_score)),
                )
                .child(
                    Element::new("span")
                        .class("metric")
                        .child(icon("magic"))
                        .text(format!(" Personalization: {}%", data.personalization_score)),
                ),
        )
        .child(
            Element::new("div")
                .class("cover-letter-content")
                .child(Element::new("textarea").attr("readonly", "").text(&data.content)),
        )
        .child(
            Element::new("div")
                .class("cover-letter-actions")
                .child(button(
                    "btn btn-primary",
                    "download-cover-letter",
                    Some("download"),
                    "Download as PDF",
                ))
                .child(button(
                    "btn btn-secondary",
                    "regenerate-cover-letter",
                    Some("sync"),
                    "Regenerate",
                ))
                .child(button(
                    "btn btn-success",
                    "use-cover-letter",
                    Some("check"),
                    "Use This Letter",
                )),
        )
}

pub fn job_matches(matches: &[JobMatch]) -> Element {
    let cards = matches.iter().map(|job| {
        let reasons = job
            .match_reasons
            .iter()
            .take(MAX_MATCH_REASONS)
            .map(|r| Element::new("span").class("reason-tag").text(r));

        Element::new("div")
            .class("job-match-card")
            .child(
                Element::new("div")
                    .class("match-score")
                    .child(Element::new("div").class("score-badge").text(format!("{}%", job.match_score))),
            )
            .child(Element::new("h4").text(&job.title))
            .child(Element::new("p").class("company").text(&job.company))
            .child(Element::new("p").class("location").text(&job.location))
            .child(Element::new("p").class("salary").text(&job.salary))
            .child(Element::new("div").class("match-reasons").children(reasons))
            .child(button(
                "btn btn-primary btn-small",
                &format!("apply-match:{}", job.id),
                None,
                "Quick Apply",
            ))
    });

    Element::new("div")
        .class("job-matches")
        .child(Element::new("h3").text("Perfect Job Matches Found!"))
        .child(Element::new("p").text(format!(
            "We found {} jobs that match your profile",
            matches.len()
        )))
        .child(Element::new("div").class("matches-grid").children(cards))
}

// ────────────────────────────────────────────────────────────────────────────
// Transient elements
// ────────────────────────────────────────────────────────────────────────────

pub fn modal(id: NodeId, title: &str, body: Element) -> Element {
    Element::new("div")
        .class("ai-modal")
        .attr("data-node", id.to_string())
        .child(
            Element::new("div")
                .class("ai-modal-content")
                .child(
                    Element::new("div")
                        .class("ai-modal-header")
                        .child(Element::new("h2").text(title))
                        .child(close_control("span", "ai-close", id)),
                )
                .child(Element::new("div").class("ai-modal-body").child(body)),
        )
}

pub fn loading(slot: &str, message: &str) -> Element {
    Element::new("div")
        .id(slot)
        .class("ai-loading")
        .child(Element::new("div").class("loading-spinner"))
        .child(Element::new("p").text(message))
}

pub fn error_banner(id: NodeId, message: &str) -> Element {
    Element::new("div")
        .class("ai-error")
        .attr("data-node", id.to_string())
        .child(icon("exclamation-triangle"))
        .child(Element::new("span").text(message))
        .child(close_control("button", "", id))
}

pub fn notification(id: NodeId, message: &str, kind: NotificationKind) -> Element {
    Element::new("div")
        .class("notification")
        .class(&format!("notification-{}", kind.as_str()))
        .attr("data-node", id.to_string())
        .child(icon(kind.icon()))
        .child(Element::new("span").text(message))
        .child(close_control("button", "", id))
}

pub fn welcome_screen(id: NodeId, user: &UserProfile) -> Element {
    let steps = [
        ("upload", "Upload Your CV", "Let our AI optimize your resume"),
        ("briefcase", "Find Jobs", "Browse personalized job matches"),
        ("rocket", "Get Hired", "Apply with one click and track applications"),
    ]
    .into_iter()
    .map(|(icon_name, title, blurb)| {
        Element::new("div")
            .class("step")
            .child(icon(icon_name))
            .child(Element::new("h3").text(title))
            .child(Element::new("p").text(blurb))
    });

    Element::new("div")
        .class("welcome-screen")
        .attr("data-node", id.to_string())
        .child(
            Element::new("div")
                .class("welcome-content")
                .child(Element::new("h2").text(format!("Welcome to JobConnect SA, {}!", user.name)))
                .child(Element::new("p").text("Your career transformation starts now!"))
                .child(Element::new("div").class("welcome-steps").children(steps))
                .child(
                    Element::new("button")
                        .class("btn btn-primary")
                        .attr("data-dismiss", id.to_string())
                        .text("LET'S GET STARTED!"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching_client::types::{ExternalId, Improvement, KeywordMatch};
    use crate::platform::jobs::sample_jobs;

    #[test]
    fn test_three_seeded_jobs_render_three_cards_with_urgent_badges() {
        let jobs = sample_jobs();
        let grid = Element::new("div").children(job_cards(&jobs));
        assert_eq!(grid.count_class("job-card"), 3);

        for (job, card) in jobs.iter().zip(grid.child_elements()) {
            assert_eq!(
                card.count_class("card-badge") == 1,
                job.urgent,
                "badge iff urgent for job {}",
                job.id
            );
        }
    }

    #[test]
    fn test_job_card_shows_monthly_salary_and_actions() {
        let job = &sample_jobs()[0];
        let card = job_card(job);
        assert!(card.text_content().contains("R85,000/month"));
        let html = card.to_html();
        assert!(html.contains("data-action=\"apply:1\""));
        assert!(html.contains("data-action=\"save:1\""));
    }

    #[test]
    fn test_city_options_start_with_all_cities_and_lowercase_values() {
        let options = city_options(&["Cape Town", "Paarl"]);
        assert_eq!(options.len(), 3);
        let html = Element::new("select").children(options).to_html();
        assert!(html.contains("<option value=\"\">All Cities</option>"));
        assert!(html.contains("<option value=\"cape town\">Cape Town</option>"));
    }

    #[test]
    fn test_cv_analysis_icons_follow_priority() {
        let analysis = CvAnalysis {
            overall_score: 78.0,
            improvements: vec![
                Improvement {
                    priority: "high".into(),
                    message: "Quantify results".into(),
                },
                Improvement {
                    priority: "low".into(),
                    message: "Shorten summary".into(),
                },
            ],
            keywords: vec![
                KeywordMatch {
                    word: "Rust".into(),
                    matched: true,
                },
                KeywordMatch {
                    word: "Kafka".into(),
                    matched: false,
                },
            ],
            extra: Default::default(),
        };
        let el = cv_analysis(&analysis);
        assert_eq!(el.count_class("fa-exclamation-triangle"), 1);
        assert_eq!(el.count_class("fa-info-circle"), 1);
        assert_eq!(el.count_class("matched"), 1);
        assert_eq!(el.count_class("missing"), 1);
        assert!(el.text_content().contains("78%"));
    }

    #[test]
    fn test_job_matches_cap_reasons_at_three() {
        let m = JobMatch {
            id: ExternalId::Number(9),
            title: "Engineer".into(),
            company: "Acme".into(),
            location: "Durban".into(),
            salary: "R70,000".into(),
            match_score: 91.0,
            match_reasons: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };
        let el = job_matches(&[m]);
        assert_eq!(el.count_class("reason-tag"), 3);
        assert!(el.text_content().contains("We found 1 jobs"));
        assert!(el.to_html().contains("data-action=\"apply-match:9\""));
    }

    #[test]
    fn test_server_content_is_escaped() {
        let letter = CoverLetter {
            relevance_score: 90.0,
            personalization_score: 85.0,
            content: "</textarea><script>x()</script>".into(),
        };
        let html = cover_letter(&letter).to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;&#x2f;textarea&gt;"));
    }

    #[test]
    fn test_notification_uses_kind_class_and_icon() {
        let el = notification(NodeId::from(4), "Saved", NotificationKind::Warning);
        assert!(el.has_class("notification-warning"));
        assert_eq!(el.count_class("fa-exclamation-triangle"), 1);
        assert!(el.to_html().contains("data-dismiss=\"4\""));
    }

    #[test]
    fn test_modal_close_control_targets_only_its_node() {
        let el = modal(NodeId::from(12), "Title", Element::new("p").text("body"));
        let html = el.to_html();
        assert!(html.contains("data-dismiss=\"12\""));
        assert!(html.contains("<h2>Title</h2>"));
    }

    #[test]
    fn test_landing_page_has_hidden_registration_modal_and_counters() {
        let page = Element::new("body").children(landing_page(&sample_jobs()));
        let modal = page.find_by_id(REGISTRATION_MODAL_ID).unwrap();
        assert_eq!(modal.attr_value("style"), Some("display: none"));
        assert_eq!(page.count_class("stat-number"), STAT_COUNTERS.len());
        assert_eq!(page.find_by_id(JOBS_GRID_ID).unwrap().count_class("job-card"), 3);
    }
}
