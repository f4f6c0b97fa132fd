use crate::{BalanceReport, ChartPoint, Movement, ResultEngine, reports};

use super::{Engine, store};

/// Balance and chart computed from the same collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub balance: BalanceReport,
    pub chart_data: Vec<ChartPoint>,
}

impl Engine {
    /// Totals over `movements`, or over every stored movement when `None`.
    ///
    /// Reports are never scoped by owner.
    pub async fn balance_report(&self, movements: Option<&[Movement]>) -> ResultEngine<BalanceReport> {
        match movements {
            Some(movements) => Ok(reports::balance(movements)),
            None => Ok(reports::balance(&store::find_all(&self.database).await?)),
        }
    }

    /// Monthly series over `movements`, or over every stored movement when
    /// `None`.
    pub async fn chart_report(&self, movements: Option<&[Movement]>) -> ResultEngine<Vec<ChartPoint>> {
        match movements {
            Some(movements) => Ok(reports::chart_data(movements)),
            None => Ok(reports::chart_data(&store::find_all(&self.database).await?)),
        }
    }

    /// Balance and chart of the whole store from a single read.
    pub async fn report(&self) -> ResultEngine<Report> {
        let movements = store::find_all(&self.database).await?;
        Ok(Report {
            balance: reports::balance(&movements),
            chart_data: reports::chart_data(&movements),
        })
    }
}
