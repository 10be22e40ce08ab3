// src/services/health_service.rs

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    common::{cache::TtlCache, error::AppError},
    db::DealRepository,
    models::{
        auth::User,
        dashboard::{ClientHealth, HealthStatus},
        deals::{Deal, DealStatus},
    },
};

const HEALTH_CACHE_TTL: Duration = Duration::from_secs(60);

/// Nota de saúde 0-100 por cliente (agrupado por nome da empresa).
/// Heurística aditiva: base 50 + faixas de volume, receita, taxa de
/// fechamento, recência e negócios abertos, com clamp no fim.
pub fn score_clients(deals: &[Deal], now: DateTime<Utc>) -> Vec<ClientHealth> {
    // BTreeMap para saída determinística
    let mut groups: BTreeMap<&str, Vec<&Deal>> = BTreeMap::new();
    for deal in deals {
        groups.entry(deal.business_name.as_str()).or_default().push(deal);
    }

    let mut result: Vec<ClientHealth> = groups
        .into_iter()
        .map(|(name, group)| score_group(name, &group, now))
        .collect();

    // Piores primeiro: é a lista de quem precisa de atenção
    result.sort_by_key(|c| c.score);
    result
}

fn score_group(client_name: &str, deals: &[&Deal], now: DateTime<Utc>) -> ClientHealth {
    let deal_count = deals.len() as u32;
    let closed_count = deals
        .iter()
        .filter(|d| d.status == DealStatus::Closed)
        .count() as u32;
    let open_count = deals.iter().filter(|d| d.is_active()).count() as u32;
    let total_revenue: Decimal = deals.iter().map(|d| d.price).sum();
    let last_contact = deals.iter().map(|d| d.created_at).max();

    let close_rate = if deal_count > 0 {
        f64::from(closed_count) / f64::from(deal_count)
    } else {
        0.0
    };

    let mut score: i32 = 50;

    // Volume de negócios
    score += match deal_count {
        n if n >= 5 => 15,
        n if n >= 3 => 10,
        n if n >= 1 => 5,
        _ => 0,
    };

    // Receita acumulada
    score += if total_revenue >= Decimal::from(100_000) {
        15
    } else if total_revenue >= Decimal::from(50_000) {
        10
    } else if total_revenue >= Decimal::from(10_000) {
        5
    } else {
        0
    };

    // Taxa de fechamento
    score += if close_rate >= 0.7 {
        15
    } else if close_rate >= 0.5 {
        10
    } else if close_rate > 0.0 {
        5
    } else {
        0
    };

    // Recência do último contato (penaliza o abandono)
    let days_since_contact = last_contact.map(|d| (now - d).num_days());
    score += match days_since_contact {
        Some(days) if days <= 7 => 15,
        Some(days) if days <= 30 => 10,
        Some(days) if days <= 90 => 5,
        _ => -10,
    };

    // Negócios abertos
    score += match open_count {
        n if n >= 3 => 15,
        n if n >= 2 => 10,
        n if n >= 1 => 5,
        _ => 0,
    };

    let score = score.clamp(0, 100);

    let status = if score >= 80 {
        HealthStatus::Healthy
    } else if score >= 60 {
        HealthStatus::Normal
    } else if score >= 40 {
        HealthStatus::AtRisk
    } else {
        HealthStatus::Critical
    };

    // Checagens independentes; podem gerar mais de uma sugestão
    let mut recommendations = Vec::new();
    if matches!(days_since_contact, Some(days) if days > 30) {
        recommendations.push("Sem contato há mais de 30 dias: agendar retomada.".to_string());
    }
    if open_count == 0 {
        recommendations.push("Nenhum negócio aberto: prospectar nova oportunidade.".to_string());
    }
    if deal_count >= 3 && close_rate < 0.3 {
        recommendations.push("Taxa de fechamento baixa: revisar abordagem comercial.".to_string());
    }
    if total_revenue >= Decimal::from(50_000) {
        recommendations.push("Cliente de alto valor: priorizar atendimento.".to_string());
    }

    ClientHealth {
        client_name: client_name.to_string(),
        score,
        status,
        deal_count,
        total_revenue,
        closed_count,
        open_count,
        last_contact,
        recommendations,
    }
}

#[derive(Clone)]
pub struct HealthService {
    deal_repo: DealRepository,
    cache: TtlCache,
}

impl HealthService {
    pub fn new(deal_repo: DealRepository, cache: TtlCache) -> Self {
        Self { deal_repo, cache }
    }

    /// Recalculado por requisição sobre a carteira visível ao usuário;
    /// o agregado fica 60s no cache.
    pub async fn client_health(&self, user: &User) -> Result<Vec<ClientHealth>, AppError> {
        let owner = if user.role.sees_all_deals() {
            None
        } else {
            Some(user.id)
        };

        let cache_key = match owner {
            Some(id) => format!("analytics:health:{}", id),
            None => "analytics:health:all".to_string(),
        };

        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(health) = serde_json::from_value(cached) {
                return Ok(health);
            }
        }

        let deals = self.deal_repo.list(owner, true).await?;
        let health = score_clients(&deals, Utc::now());

        if let Ok(value) = serde_json::to_value(&health) {
            self.cache.put(cache_key, value, HEALTH_CACHE_TTL);
        }

        Ok(health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::deals::DealStatus;
    use uuid::Uuid;

    fn deal(name: &str, status: DealStatus, price: i64, days_ago: i64) -> Deal {
        let now = Utc::now();
        Deal {
            id: Uuid::new_v4(),
            business_name: name.into(),
            contact_person: None,
            phone_number: None,
            email: None,
            status,
            price: Decimal::from(price),
            notes: None,
            archived: false,
            source_contact_id: None,
            created_by: Uuid::new_v4(),
            created_by_name: "Maria".into(),
            status_updated_at: now,
            last_auto_follow_up_at: None,
            last_auto_follow_up_stage: None,
            edit_history: serde_json::json!([]),
            created_at: now - chrono::Duration::days(days_ago),
            updated_at: now,
        }
    }

    #[test]
    fn score_is_clamped_to_hundred() {
        let now = Utc::now();
        // Cliente "perfeito": volume alto, receita alta, tudo recente
        let deals: Vec<Deal> = (0..6)
            .map(|i| {
                let status = if i < 4 {
                    DealStatus::Closed
                } else {
                    DealStatus::Negotiation
                };
                deal("Atacadão Central", status, 30_000, 1)
            })
            .collect();

        let health = score_clients(&deals, now);
        assert_eq!(health.len(), 1);
        assert!(health[0].score <= 100);
        assert_eq!(health[0].status, HealthStatus::Healthy);
    }

    #[test]
    fn score_never_goes_below_zero() {
        let now = Utc::now();
        // Um negócio perdido, antigo, sem receita
        let deals = vec![deal("Loja Parada", DealStatus::Lost, 0, 400)];

        let health = score_clients(&deals, now);
        assert!(health[0].score >= 0);
        assert_eq!(health[0].open_count, 0);
    }

    #[test]
    fn more_deals_never_lower_the_score() {
        let now = Utc::now();

        let one = vec![deal("Cliente A", DealStatus::Negotiation, 5_000, 3)];
        let three = vec![
            deal("Cliente A", DealStatus::Negotiation, 5_000, 3),
            deal("Cliente A", DealStatus::Negotiation, 5_000, 3),
            deal("Cliente A", DealStatus::Negotiation, 5_000, 3),
        ];

        let score_one = score_clients(&one, now)[0].score;
        let score_three = score_clients(&three, now)[0].score;
        assert!(score_three >= score_one);
    }

    #[test]
    fn more_revenue_never_lowers_the_score() {
        let now = Utc::now();

        let small = vec![deal("Cliente B", DealStatus::Closed, 9_000, 3)];
        let big = vec![deal("Cliente B", DealStatus::Closed, 120_000, 3)];

        assert!(score_clients(&big, now)[0].score >= score_clients(&small, now)[0].score);
    }

    #[test]
    fn stale_client_is_penalized() {
        let now = Utc::now();

        let fresh = vec![deal("Cliente C", DealStatus::Proposal, 5_000, 2)];
        let stale = vec![deal("Cliente C", DealStatus::Proposal, 5_000, 200)];

        let fresh_score = score_clients(&fresh, now)[0].score;
        let stale_score = score_clients(&stale, now)[0].score;
        assert!(fresh_score > stale_score);

        let stale_health = &score_clients(&stale, now)[0];
        assert!(stale_health
            .recommendations
            .iter()
            .any(|r| r.contains("30 dias")));
    }

    #[test]
    fn groups_by_business_name() {
        let now = Utc::now();
        let deals = vec![
            deal("Cliente A", DealStatus::Closed, 10_000, 1),
            deal("Cliente B", DealStatus::Proposal, 2_000, 1),
            deal("Cliente A", DealStatus::Negotiation, 3_000, 1),
        ];

        let health = score_clients(&deals, now);
        assert_eq!(health.len(), 2);

        let a = health.iter().find(|c| c.client_name == "Cliente A").unwrap();
        assert_eq!(a.deal_count, 2);
        assert_eq!(a.closed_count, 1);
        assert_eq!(a.open_count, 1);
    }

    #[test]
    fn worst_clients_come_first() {
        let now = Utc::now();
        let deals = vec![
            deal("Saudável", DealStatus::Closed, 120_000, 1),
            deal("Abandonado", DealStatus::Lost, 0, 300),
        ];

        let health = score_clients(&deals, now);
        assert_eq!(health[0].client_name, "Abandonado");
        assert!(health[0].score <= health[1].score);
    }
}
