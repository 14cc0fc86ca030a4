use actix_web::web::Data;
use actix_web::HttpResponse;
use maud::{DOCTYPE, Markup, html};

use crate::controller::report::data_service;
use crate::error::AppError;
use crate::model::{
    Caller, DashboardStats, ParGroup, PerformanceByPar, ReportFilter, ScoreBucket,
    ScoringDistribution,
};
use crate::storage::Storage;

pub async fn report_page(
    caller: Caller,
    storage: Data<dyn Storage>,
) -> Result<HttpResponse, AppError> {
    let storage = storage.get_ref();
    let filter = ReportFilter::default();
    let (stats, distribution, by_par) = match storage.player_for_user(&caller.user_id).await? {
        Some(player) => futures::try_join!(
            data_service::dashboard_stats(storage, &caller),
            data_service::scoring_distribution(storage, player.player_id, &filter),
            data_service::performance_by_par(storage, player.player_id, &filter),
        )?,
        None => (
            DashboardStats::default(),
            ScoringDistribution::default(),
            PerformanceByPar::default(),
        ),
    };
    let markup = render_report_page(&stats, &distribution, &by_par);
    Ok(HttpResponse::Ok()
        .content_type("text/html")
        .body(markup.into_string()))
}

#[must_use]
pub fn render_report_page(
    stats: &DashboardStats,
    distribution: &ScoringDistribution,
    by_par: &PerformanceByPar,
) -> Markup {
    html! {
        (DOCTYPE)
        head {
            meta charset="UTF-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            link rel="stylesheet" type="text/css" href="static/report.css";
            title { "Golf Report" }
        }
        body {
            h1 { "My Golf" }
            (render_dashboard(stats))
            (render_distribution(distribution))
            (render_performance_by_par(by_par))
        }
    }
}

fn optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn render_dashboard(stats: &DashboardStats) -> Markup {
    html! {
        h3 { "Dashboard" }
        @if stats.total_rounds == 0 {
            p class="empty" { "No completed rounds yet." }
        } @else {
            table class="styled-table" {
                tbody {
                    tr { th { "Rounds" } td { (stats.total_rounds) } }
                    tr {
                        th { "Best score" }
                        td {
                            (optional(stats.best_score))
                            @if let Some(course) = &stats.best_score_course_name {
                                " at " (course)
                            }
                        }
                    }
                    tr { th { "Average score" } td { (optional(stats.average_score.map(|a| format!("{a:.1}")))) } }
                    tr { th { "Average to par" } td { (optional(stats.average_to_par.map(|a| format!("{a:+.1}")))) } }
                    tr { th { "Favourite course" } td { (optional(stats.favorite_course_name.as_deref())) } }
                    tr { th { "Last round" } td { (optional(stats.last_round_date)) } }
                    @if stats.current_streak > 0 {
                        tr {
                            th { "Streak" }
                            td class=(if stats.is_improving_streak { "improving" } else { "declining" }) {
                                (stats.current_streak)
                                @if stats.is_improving_streak { " improving" } @else { " declining" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_distribution(distribution: &ScoringDistribution) -> Markup {
    html! {
        h3 { "Scoring Distribution" }
        table class="styled-table" {
            thead {
                tr {
                    th { "Result" }
                    th { "Holes" }
                    th { "%" }
                }
            }
            tbody {
                @for bucket in ScoreBucket::ALL {
                    tr class=(bucket.css_class()) {
                        td { (bucket.label()) }
                        td { (distribution.count(bucket)) }
                        td { (format!("{:.1}", distribution.percentage(bucket))) }
                    }
                }
            }
        }
    }
}

fn render_par_row(group: &ParGroup) -> Markup {
    html! {
        tr {
            td { "Par " (group.par) }
            @if group.has_data {
                td { (format!("{:.2}", group.average)) }
                td { (format!("{:+.2}", group.relative_to_par)) }
                td { (group.count) }
            } @else {
                td { "-" }
                td { "-" }
                td { "0" }
            }
        }
    }
}

fn render_performance_by_par(by_par: &PerformanceByPar) -> Markup {
    html! {
        h3 { "Performance by Par" }
        table class="styled-table" {
            thead {
                tr {
                    th { "Hole" }
                    th { "Average" }
                    th { "vs Par" }
                    th { "Holes" }
                }
            }
            tbody {
                (render_par_row(&by_par.par3))
                (render_par_row(&by_par.par4))
                (render_par_row(&by_par.par5))
            }
        }
    }
}
