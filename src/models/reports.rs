// src/models/reports.rs

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

// 1. Linha do relatório de rentabilidade (uma por cliente)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfitability {
    pub client_id: Uuid,
    #[schema(example = "Oficinas Centro S.L.")]
    pub client_name: String,
    #[schema(example = "150.00")]
    pub revenue: Decimal,
    #[schema(example = "86.60")]
    pub labor_cost: Decimal,
    #[schema(example = "12.00")]
    pub material_cost: Decimal,
    #[schema(example = "98.60")]
    pub total_cost: Decimal,
    #[schema(example = "51.40")]
    pub profit: Decimal,
    // Percentual sobre a receita; 0 quando não há receita
    #[schema(example = "34.27")]
    #[serde(serialize_with = "serialize_margin")]
    pub margin: Decimal,
}

// 2. Cartões de topo (somatório da carteira)
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub revenue: Decimal,
    pub labor_cost: Decimal,
    pub material_cost: Decimal,
    pub total_cost: Decimal,
    pub profit: Decimal,
    #[serde(serialize_with = "serialize_margin")]
    pub margin: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityReport {
    pub totals: PortfolioTotals,
    pub sort: ReportSort,
    pub clients: Vec<ClientProfitability>,
}

// 3. Ordenação da tabela (estado de tela como valor + redutor puro)

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Revenue,
    TotalCost,
    Profit,
    Margin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for ReportSort {
    // Ordem base do relatório: lucro decrescente
    fn default() -> Self {
        Self {
            column: SortColumn::Profit,
            direction: SortDirection::Desc,
        }
    }
}

impl ReportSort {
    /// Clique numa coluna: a mesma coluna inverte a direção,
    /// outra coluna começa sempre decrescente.
    pub fn select(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Desc,
            }
        }
    }

    fn key(&self, row: &ClientProfitability) -> Decimal {
        match self.column {
            SortColumn::Revenue => row.revenue,
            SortColumn::TotalCost => row.total_cost,
            SortColumn::Profit => row.profit,
            SortColumn::Margin => row.margin,
        }
    }

    /// Devolve as linhas reordenadas. A ordenação é estável, então empates
    /// mantêm a ordem base.
    pub fn apply(&self, mut rows: Vec<ClientProfitability>) -> Vec<ClientProfitability> {
        rows.sort_by(|a, b| {
            let ord = self.key(a).cmp(&self.key(b));
            match self.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        rows
    }
}

impl PortfolioTotals {
    pub fn from_rows(rows: &[ClientProfitability]) -> Self {
        let mut totals = rows.iter().fold(Self::default(), |mut acc, row| {
            acc.revenue += row.revenue;
            acc.labor_cost += row.labor_cost;
            acc.material_cost += row.material_cost;
            acc.total_cost += row.total_cost;
            acc.profit += row.profit;
            acc
        });
        totals.margin = margin_percent(totals.profit, totals.revenue);
        totals
    }
}

/// lucro / receita × 100, em precisão cheia. Sem receita, margem 0.
pub fn margin_percent(profit: Decimal, revenue: Decimal) -> Decimal {
    match revenue.cmp(&Decimal::ZERO) {
        Ordering::Greater => profit
            .checked_div(revenue)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

// O arredondamento em 2 casas fica só na saída; ordenação e somas usam o valor cheio
fn serialize_margin<S: Serializer>(margin: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    Serialize::serialize(&margin.round_dp(2), serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, revenue: i64, total_cost: i64) -> ClientProfitability {
        let revenue = Decimal::from(revenue);
        let total_cost = Decimal::from(total_cost);
        let profit = revenue - total_cost;
        ClientProfitability {
            client_id: Uuid::new_v4(),
            client_name: name.to_string(),
            revenue,
            labor_cost: total_cost,
            material_cost: Decimal::ZERO,
            total_cost,
            profit,
            margin: margin_percent(profit, revenue),
        }
    }

    fn names(rows: &[ClientProfitability]) -> Vec<&str> {
        rows.iter().map(|r| r.client_name.as_str()).collect()
    }

    #[test]
    fn same_column_toggles_and_new_column_resets_to_desc() {
        let sort = ReportSort::default();
        let by_revenue = sort.select(SortColumn::Revenue);
        assert_eq!(by_revenue.direction, SortDirection::Desc);

        let again = by_revenue.select(SortColumn::Revenue);
        assert_eq!(again.direction, SortDirection::Asc);

        let third = again.select(SortColumn::Revenue);
        assert_eq!(third.direction, SortDirection::Desc);

        let switched = again.select(SortColumn::Margin);
        assert_eq!(switched, ReportSort { column: SortColumn::Margin, direction: SortDirection::Desc });
    }

    #[test]
    fn apply_orders_by_the_selected_column() {
        let rows = vec![row("a", 100, 90), row("b", 300, 100), row("c", 200, 10)];

        let by_revenue = ReportSort { column: SortColumn::Revenue, direction: SortDirection::Asc };
        assert_eq!(names(&by_revenue.apply(rows.clone())), vec!["a", "c", "b"]);

        let by_cost = ReportSort { column: SortColumn::TotalCost, direction: SortDirection::Desc };
        assert_eq!(names(&by_cost.apply(rows.clone())), vec!["b", "a", "c"]);

        let by_margin = ReportSort { column: SortColumn::Margin, direction: SortDirection::Desc };
        assert_eq!(names(&by_margin.apply(rows)), vec!["c", "b", "a"]);
    }

    #[test]
    fn margin_is_zero_without_revenue() {
        assert_eq!(margin_percent(Decimal::from(-50), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(margin_percent(Decimal::from(25), Decimal::from(100)), Decimal::from(25));
    }

    #[test]
    fn margin_keeps_full_precision_and_rounds_on_output() {
        let margin = margin_percent(Decimal::ONE, Decimal::from(3));
        assert!(margin > Decimal::new(3333, 2));
        assert!(margin < Decimal::new(3334, 2));

        let mut a = row("a", 300, 200);
        let mut b = row("b", 300, 200);
        a.margin = Decimal::new(333_334, 4);
        b.margin = Decimal::new(333_333, 4);
        let by_margin = ReportSort { column: SortColumn::Margin, direction: SortDirection::Desc };
        assert_eq!(names(&by_margin.apply(vec![b.clone(), a])), vec!["a", "b"]);

        b.margin = margin;
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["margin"], serde_json::json!(33.33));
    }

    #[test]
    fn totals_sum_rows_and_recompute_margin() {
        let totals = PortfolioTotals::from_rows(&[row("a", 100, 50), row("b", 100, 150)]);
        assert_eq!(totals.revenue, Decimal::from(200));
        assert_eq!(totals.total_cost, Decimal::from(200));
        assert_eq!(totals.profit, Decimal::ZERO);
        assert_eq!(totals.margin, Decimal::ZERO);
    }
}
