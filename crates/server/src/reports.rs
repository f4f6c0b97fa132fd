//! Reports API endpoints

use api_types::{
    ErrorResponse,
    report::{Balance, ChartPoint, Report},
};
use axum::{
    Extension, Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use engine::Identity;

use crate::{ServerError, require_admin, server::ServerState};

fn map_point(point: engine::ChartPoint) -> ChartPoint {
    ChartPoint {
        month: point.month,
        income_minor: point.income,
        expense_minor: point.expense,
    }
}

/// Balance and monthly series over every movement.
#[utoipa::path(
    get,
    path = "/reports",
    tag = "reports",
    responses(
        (status = 200, body = Report),
        (status = 403, body = ErrorResponse),
    )
)]
pub async fn get_report(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Report>, ServerError> {
    require_admin(&identity)?;

    let report = state.engine.report().await?;
    Ok(Json(Report {
        balance: Balance {
            income_minor: report.balance.income,
            expense_minor: report.balance.expense,
            balance_minor: report.balance.balance,
        },
        chart_data: report.chart_data.into_iter().map(map_point).collect(),
    }))
}

fn chart_to_csv(points: &[engine::ChartPoint]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["month", "income_minor", "expense_minor"])?;
    for point in points {
        writer.write_record([
            point.month.clone(),
            point.income.to_string(),
            point.expense.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

/// The monthly series as `text/csv`, one row per month.
#[utoipa::path(
    get,
    path = "/reports/chart.csv",
    tag = "reports",
    responses(
        (status = 200, description = "`month,income_minor,expense_minor` rows", content_type = "text/csv", body = String),
        (status = 403, body = ErrorResponse),
    )
)]
pub async fn chart_csv(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Response, ServerError> {
    require_admin(&identity)?;

    let points = state.engine.chart_report(None).await?;
    let body = chart_to_csv(&points).map_err(|err| ServerError::Internal(err.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"chart.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_and_one_row_per_month() {
        let points = vec![
            engine::ChartPoint {
                month: "2025-01".to_string(),
                income: 100,
                expense: 0,
            },
            engine::ChartPoint {
                month: "2025-03".to_string(),
                income: 0,
                expense: 30,
            },
        ];
        let body = String::from_utf8(chart_to_csv(&points).unwrap()).unwrap();
        assert_eq!(
            body,
            "month,income_minor,expense_minor\n2025-01,100,0\n2025-03,0,30\n"
        );
    }

    #[test]
    fn empty_chart_is_header_only() {
        let body = String::from_utf8(chart_to_csv(&[]).unwrap()).unwrap();
        assert_eq!(body, "month,income_minor,expense_minor\n");
    }
}
