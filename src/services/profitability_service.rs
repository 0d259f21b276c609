// src/services/profitability_service.rs

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        clients::Client,
        finance::{FinancialTransaction, TransactionKind},
        jobs::{JobRecord, JobStatus},
        materials::{InventoryItem, MaterialRequest, MaterialRequestStatus},
        reports::{margin_percent, ClientProfitability, PortfolioTotals, ProfitabilityReport, ReportSort},
        staff::{EmployeeDirectory, EmployeeRecord},
    },
};

/// Semanas médias por mês usadas para projetar o custo contratado.
pub const AVERAGE_WEEKS_PER_MONTH: Decimal = Decimal::from_parts(433, 0, 0, false, 2);

/// Cada serviço realizado conta como exatamente uma hora faturável.
/// Não há duração registrada; os números do relatório dependem dessa regra.
pub const HOURS_PER_COMPLETED_JOB: Decimal = Decimal::ONE;

/// Horas por visita contratada.
pub const HOURS_PER_CONTRACTED_VISIT: Decimal = Decimal::ONE;

// As seis coleções lidas para o relatório, já em memória
#[derive(Debug, Clone, Default)]
pub struct ProfitabilitySnapshot {
    pub clients: Vec<Client>,
    pub income: Vec<FinancialTransaction>,
    pub completed_jobs: Vec<JobRecord>,
    pub employees: Vec<EmployeeRecord>,
    pub approved_requests: Vec<MaterialRequest>,
    pub inventory: Vec<InventoryItem>,
}

// Fonte dos dados do relatório (Postgres em produção, memória nos testes).
// Qualquer falha de leitura aborta o relatório inteiro.
#[async_trait]
pub trait ProfitabilitySource: Send + Sync {
    async fn load_snapshot(&self) -> Result<ProfitabilitySnapshot, AppError>;
}

// ---
// Vínculo lançamento -> cliente
// ---
// Compatibilidade com dados antigos: lançamentos legados só têm o nome do
// cliente, os novos têm o id. Consultamos as duas chaves e somamos cada
// lançamento uma única vez.
// TODO: migrar os lançamentos legados para client_id e remover a busca por nome.
struct TransactionLinks<'a> {
    income: Vec<&'a FinancialTransaction>,
    by_name: HashMap<&'a str, Vec<usize>>,
    by_client_id: HashMap<Uuid, Vec<usize>>,
}

impl<'a> TransactionLinks<'a> {
    fn new(transactions: &'a [FinancialTransaction]) -> Self {
        let income: Vec<&FinancialTransaction> = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Income)
            .collect();

        let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut by_client_id: HashMap<Uuid, Vec<usize>> = HashMap::new();

        for (idx, tx) in income.iter().enumerate() {
            if let Some(name) = tx.linked_entity_name.as_deref() {
                by_name.entry(name).or_default().push(idx);
            }
            if let Some(client_id) = tx.client_id {
                by_client_id.entry(client_id).or_default().push(idx);
            }
        }

        Self { income, by_name, by_client_id }
    }

    fn income_for(&self, client: &Client) -> Decimal {
        let mut matched: BTreeSet<usize> = BTreeSet::new();
        if let Some(ids) = self.by_name.get(client.name.as_str()) {
            matched.extend(ids);
        }
        if let Some(ids) = self.by_client_id.get(&client.id) {
            matched.extend(ids);
        }
        matched.into_iter().map(|idx| self.income[idx].amount).sum()
    }
}

/// Monta uma linha por cliente, ordenada por lucro decrescente.
pub fn build_profitability_report(snapshot: &ProfitabilitySnapshot) -> Vec<ClientProfitability> {
    let directory = EmployeeDirectory::from_records(&snapshot.employees);
    let links = TransactionLinks::new(&snapshot.income);

    // Preço por nome de produto (o primeiro cadastro vence)
    let mut unit_prices: HashMap<&str, Decimal> = HashMap::new();
    for item in &snapshot.inventory {
        unit_prices.entry(item.product_name.as_str()).or_insert(item.unit_price);
    }

    let mut jobs_by_client: HashMap<Uuid, Vec<&JobRecord>> = HashMap::new();
    for job in snapshot.completed_jobs.iter().filter(|j| j.status == JobStatus::Completed) {
        jobs_by_client.entry(job.client_id).or_default().push(job);
    }

    let mut requests_by_client: HashMap<Uuid, Vec<&MaterialRequest>> = HashMap::new();
    for request in snapshot
        .approved_requests
        .iter()
        .filter(|r| r.status == MaterialRequestStatus::Approved)
    {
        requests_by_client.entry(request.client_id).or_default().push(request);
    }

    let mut rows: Vec<ClientProfitability> = snapshot
        .clients
        .iter()
        .map(|client| {
            // 1. Receita: lançamentos vinculados + mensalidade
            let revenue = links.income_for(client) + client.monthly_fee.unwrap_or(Decimal::ZERO);

            // 2. Mão de obra: o maior entre o realizado e o contratado
            let actual_labor: Decimal = jobs_by_client
                .get(&client.id)
                .map(|jobs| {
                    jobs.iter()
                        .map(|job| directory.hourly_rate(job.employee_ref.as_deref()) * HOURS_PER_COMPLETED_JOB)
                        .sum::<Decimal>()
                })
                .unwrap_or(Decimal::ZERO);

            let estimated_labor = estimated_monthly_labor(client, &directory);
            let labor_cost = actual_labor.max(estimated_labor);

            // 3. Material aprovado a preço de estoque
            let material_cost: Decimal = requests_by_client
                .get(&client.id)
                .map(|requests| {
                    requests
                        .iter()
                        .map(|r| {
                            let unit_price = unit_prices
                                .get(r.product_name.as_str())
                                .copied()
                                .unwrap_or(Decimal::ZERO);
                            r.quantity * unit_price
                        })
                        .sum::<Decimal>()
                })
                .unwrap_or(Decimal::ZERO);

            // 4. Resultado
            let total_cost = labor_cost + material_cost;
            let profit = revenue - total_cost;

            ClientProfitability {
                client_id: client.id,
                client_name: client.name.clone(),
                revenue,
                labor_cost,
                material_cost,
                total_cost,
                profit,
                margin: margin_percent(profit, revenue),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.profit.cmp(&a.profit));
    rows
}

/// visitas/semana × horas/visita × 4,33 × valor/hora do responsável.
/// Zero quando não há dias contratados ou responsável.
pub fn estimated_monthly_labor(client: &Client, directory: &EmployeeDirectory) -> Decimal {
    let visits = client.weekly_visits();
    let Some(assigned) = client.assigned_employee_ref.as_deref() else {
        return Decimal::ZERO;
    };
    if visits == 0 {
        return Decimal::ZERO;
    }

    let weekly_hours = Decimal::from(visits) * HOURS_PER_CONTRACTED_VISIT;
    weekly_hours * AVERAGE_WEEKS_PER_MONTH * directory.hourly_rate(Some(assigned))
}

#[derive(Clone)]
pub struct ProfitabilityService {
    source: Arc<dyn ProfitabilitySource>,
}

impl ProfitabilityService {
    pub fn new(source: Arc<dyn ProfitabilitySource>) -> Self {
        Self { source }
    }

    /// Lê tudo, calcula e devolve o relatório (na ordem pedida, ou lucro decrescente).
    pub async fn client_report(&self, sort: Option<ReportSort>) -> Result<ProfitabilityReport, AppError> {
        let snapshot = self.source.load_snapshot().await?;

        let rows = build_profitability_report(&snapshot);
        let totals = PortfolioTotals::from_rows(&rows);

        let sort = sort.unwrap_or_default();
        let clients = if sort == ReportSort::default() { rows } else { sort.apply(rows) };

        tracing::info!(
            clients = clients.len(),
            employees = snapshot.employees.len(),
            "📊 Relatório de rentabilidade calculado"
        );

        Ok(ProfitabilityReport { totals, sort, clients })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::jobs::JobOrigin;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn client(name: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: name.to_string(),
            monthly_fee: None,
            contracted_weekdays: vec![],
            assigned_employee_ref: None,
            created_at: Utc::now(),
        }
    }

    fn employee(rate: serde_json::Value) -> EmployeeRecord {
        EmployeeRecord {
            id: Uuid::new_v4(),
            full_name: "Lucía Gómez".to_string(),
            internal_code: Some("E-01".to_string()),
            auth_uid: Some("auth|lucia".to_string()),
            legacy_id: None,
            hourly_rate: Some(rate),
            created_at: Utc::now(),
        }
    }

    fn income(client_id: Option<Uuid>, name: Option<&str>, amount: &str) -> FinancialTransaction {
        FinancialTransaction {
            id: Uuid::new_v4(),
            kind: TransactionKind::Income,
            client_id,
            linked_entity_name: name.map(str::to_string),
            amount: dec(amount),
            occurred_on: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn completed_job(client_id: Uuid, employee_ref: Option<&str>) -> JobRecord {
        let day = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        JobRecord {
            id: Uuid::new_v4(),
            client_id,
            client_name: String::new(),
            employee_ref: employee_ref.map(str::to_string),
            employee_name: String::new(),
            description: "Limpieza".to_string(),
            origin: JobOrigin::Manual,
            status: JobStatus::Completed,
            price: None,
            scheduled_start: day.and_hms_opt(9, 0, 0).unwrap(),
            scheduled_end: day.and_hms_opt(11, 0, 0).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn request(client_id: Uuid, product: &str, quantity: &str, status: MaterialRequestStatus) -> MaterialRequest {
        MaterialRequest {
            id: Uuid::new_v4(),
            client_id,
            product_name: product.to_string(),
            quantity: dec(quantity),
            status,
            created_at: Utc::now(),
        }
    }

    fn item(product: &str, price: &str) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            product_name: product.to_string(),
            unit_price: dec(price),
        }
    }

    fn only_row(snapshot: &ProfitabilitySnapshot) -> ClientProfitability {
        let rows = build_profitability_report(snapshot);
        assert_eq!(rows.len(), 1);
        rows.into_iter().next().unwrap()
    }

    #[test]
    fn client_without_activity_is_all_zeros() {
        let snapshot = ProfitabilitySnapshot {
            clients: vec![client("Vacío")],
            ..Default::default()
        };

        let row = only_row(&snapshot);
        assert_eq!(row.revenue, Decimal::ZERO);
        assert_eq!(row.labor_cost, Decimal::ZERO);
        assert_eq!(row.material_cost, Decimal::ZERO);
        assert_eq!(row.profit, Decimal::ZERO);
        assert_eq!(row.margin, Decimal::ZERO);
    }

    #[test]
    fn revenue_is_fee_plus_linked_income() {
        let mut c = client("Bar Sol");
        c.monthly_fee = Some(dec("100"));
        let snapshot = ProfitabilitySnapshot {
            income: vec![income(Some(c.id), None, "50")],
            clients: vec![c],
            ..Default::default()
        };

        assert_eq!(only_row(&snapshot).revenue, dec("150"));
    }

    #[test]
    fn income_links_by_name_or_id_without_double_counting() {
        let c = client("Bar Sol");
        let other = client("Otro");
        let snapshot = ProfitabilitySnapshot {
            income: vec![
                income(None, Some("Bar Sol"), "10"),      // legado: só nome
                income(Some(c.id), None, "20"),           // novo: só id
                income(Some(c.id), Some("Bar Sol"), "5"), // os dois: conta uma vez
                income(Some(other.id), None, "1000"),
            ],
            clients: vec![c.clone()],
            ..Default::default()
        };

        assert_eq!(only_row(&snapshot).revenue, dec("35"));
    }

    #[test]
    fn expense_transactions_never_count_as_revenue() {
        let c = client("Bar Sol");
        let mut expense = income(Some(c.id), None, "80");
        expense.kind = TransactionKind::Expense;
        let snapshot = ProfitabilitySnapshot {
            income: vec![expense],
            clients: vec![c],
            ..Default::default()
        };

        assert_eq!(only_row(&snapshot).revenue, Decimal::ZERO);
    }

    #[test]
    fn contracted_cadence_sets_labor_when_no_jobs_are_done() {
        let e = employee(json!(10));
        let mut c = client("Clínica Norte");
        c.contracted_weekdays = vec!["L".into(), "X".into()];
        c.assigned_employee_ref = Some(e.id.to_string());

        let snapshot = ProfitabilitySnapshot {
            clients: vec![c],
            employees: vec![e],
            ..Default::default()
        };

        // 2 × 4,33 × 10
        assert_eq!(only_row(&snapshot).labor_cost, dec("86.6"));
    }

    #[test]
    fn near_max_rate_degrades_to_zero_labor() {
        let e = employee(json!("79228162514264337593543950335"));
        let mut c = client("Importado");
        c.monthly_fee = Some(dec("100"));
        c.contracted_weekdays = vec!["L".into(), "X".into()];
        c.assigned_employee_ref = Some(e.id.to_string());

        let snapshot = ProfitabilitySnapshot {
            completed_jobs: vec![completed_job(c.id, Some("E-01")); 3],
            clients: vec![c],
            employees: vec![e],
            ..Default::default()
        };

        let row = only_row(&snapshot);
        assert_eq!(row.labor_cost, Decimal::ZERO);
        assert_eq!(row.profit, dec("100"));
    }

    #[test]
    fn labor_keeps_the_estimate_when_actuals_are_lower() {
        let e = employee(json!("10,00"));
        let mut c = client("Clínica Norte");
        c.contracted_weekdays = vec!["L".into(), "X".into()];
        c.assigned_employee_ref = Some("E-01".into());

        let snapshot = ProfitabilitySnapshot {
            completed_jobs: vec![completed_job(c.id, Some("auth|lucia"))],
            clients: vec![c],
            employees: vec![e],
            ..Default::default()
        };

        let row = only_row(&snapshot);
        assert_eq!(row.labor_cost, dec("86.6"));
    }

    #[test]
    fn extra_visits_beyond_the_contract_raise_labor() {
        let e = employee(json!(10));
        let mut c = client("Hotel Mar");
        c.contracted_weekdays = vec!["L".into()];
        c.assigned_employee_ref = Some(e.id.to_string());

        // 5 serviços × 10 = 50 > 1 × 4,33 × 10 = 43,3
        let jobs = (0..5).map(|_| completed_job(c.id, Some("E-01"))).collect();
        let snapshot = ProfitabilitySnapshot {
            completed_jobs: jobs,
            clients: vec![c],
            employees: vec![e],
            ..Default::default()
        };

        assert_eq!(only_row(&snapshot).labor_cost, dec("50"));
    }

    #[test]
    fn jobs_without_a_known_employee_cost_nothing() {
        let c = client("Hotel Mar");
        let snapshot = ProfitabilitySnapshot {
            completed_jobs: vec![completed_job(c.id, None), completed_job(c.id, Some("desconocido"))],
            clients: vec![c],
            employees: vec![employee(json!(12))],
            ..Default::default()
        };

        assert_eq!(only_row(&snapshot).labor_cost, Decimal::ZERO);
    }

    #[test]
    fn pending_jobs_are_ignored_even_if_the_source_returns_them() {
        let e = employee(json!(10));
        let c = client("Hotel Mar");
        let mut pending = completed_job(c.id, Some("E-01"));
        pending.status = JobStatus::Pending;

        let snapshot = ProfitabilitySnapshot {
            completed_jobs: vec![pending],
            clients: vec![c],
            employees: vec![e],
            ..Default::default()
        };

        assert_eq!(only_row(&snapshot).labor_cost, Decimal::ZERO);
    }

    #[test]
    fn materials_use_inventory_price_by_product_name() {
        let c = client("Colegio");
        let snapshot = ProfitabilitySnapshot {
            approved_requests: vec![
                request(c.id, "Lejía 5L", "3", MaterialRequestStatus::Approved),
                request(c.id, "Bayetas", "2", MaterialRequestStatus::Approved),
                request(c.id, "Producto raro", "7", MaterialRequestStatus::Approved),
                request(c.id, "Lejía 5L", "100", MaterialRequestStatus::Pending),
            ],
            inventory: vec![item("Lejía 5L", "4.50"), item("Bayetas", "1.25")],
            clients: vec![c],
            ..Default::default()
        };

        let row = only_row(&snapshot);
        assert_eq!(row.material_cost, dec("16"));
        assert_eq!(row.total_cost, dec("16"));
        assert_eq!(row.profit, dec("-16"));
        assert_eq!(row.margin, Decimal::ZERO);
    }

    #[test]
    fn margin_is_profit_over_revenue() {
        let e = employee(json!(10));
        let mut c = client("Gimnasio");
        c.monthly_fee = Some(dec("200"));
        let snapshot = ProfitabilitySnapshot {
            completed_jobs: vec![completed_job(c.id, Some("E-01")); 5],
            clients: vec![c],
            employees: vec![e],
            ..Default::default()
        };

        let row = only_row(&snapshot);
        assert_eq!(row.profit, dec("150"));
        assert_eq!(row.margin, dec("75"));
    }

    #[test]
    fn one_row_per_client_sorted_by_profit() {
        let mut rich = client("Rico");
        rich.monthly_fee = Some(dec("500"));
        let mut middle = client("Medio");
        middle.monthly_fee = Some(dec("100"));
        let poor = client("Pobre");

        let snapshot = ProfitabilitySnapshot {
            approved_requests: vec![request(poor.id, "Bayetas", "4", MaterialRequestStatus::Approved)],
            inventory: vec![item("Bayetas", "1")],
            clients: vec![poor, rich, middle],
            ..Default::default()
        };

        let rows = build_profitability_report(&snapshot);
        let names: Vec<&str> = rows.iter().map(|r| r.client_name.as_str()).collect();
        assert_eq!(names, vec!["Rico", "Medio", "Pobre"]);
    }

    // --- Serviço com fonte em memória ---

    struct FakeSource {
        snapshot: ProfitabilitySnapshot,
        fail: bool,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl ProfitabilitySource for FakeSource {
        async fn load_snapshot(&self) -> Result<ProfitabilitySnapshot, AppError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
            }
            Ok(self.snapshot.clone())
        }
    }

    #[tokio::test]
    async fn report_applies_the_requested_sort_and_totals() {
        let mut a = client("A");
        a.monthly_fee = Some(dec("100"));
        let mut b = client("B");
        b.monthly_fee = Some(dec("300"));

        let source = Arc::new(FakeSource {
            snapshot: ProfitabilitySnapshot { clients: vec![a, b], ..Default::default() },
            fail: false,
            loads: AtomicUsize::new(0),
        });
        let service = ProfitabilityService::new(source.clone());

        let base = service.client_report(None).await.unwrap();
        assert_eq!(base.clients[0].client_name, "B");
        assert_eq!(base.totals.revenue, dec("400"));
        assert_eq!(base.totals.margin, dec("100"));

        let asc = ReportSort::default().select(crate::models::reports::SortColumn::Profit);
        let flipped = service.client_report(Some(asc)).await.unwrap();
        assert_eq!(flipped.clients[0].client_name, "A");
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn any_read_failure_aborts_the_report() {
        let service = ProfitabilityService::new(Arc::new(FakeSource {
            snapshot: ProfitabilitySnapshot { clients: vec![client("A")], ..Default::default() },
            fail: true,
            loads: AtomicUsize::new(0),
        }));

        assert!(matches!(service.client_report(None).await, Err(AppError::DatabaseError(_))));
    }
}
