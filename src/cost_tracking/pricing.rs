use crate::database::entities::ModelCost;
use chrono::Utc;
use rust_decimal::Decimal;

/// Embedded default rates, USD per 1000 tokens. Seeded insert-if-absent at
/// startup; admins adjust live rates through the price table endpoints.
pub fn default_model_costs() -> Vec<ModelCost> {
    let now = Utc::now();

    [
        // (model, input $/1k, output $/1k)
        ("gpt-4o", Decimal::new(25, 4), Decimal::new(100, 4)),
        ("gpt-4o-mini", Decimal::new(15, 5), Decimal::new(60, 5)),
        ("gpt-4.1", Decimal::new(20, 4), Decimal::new(80, 4)),
        ("gpt-4.1-mini", Decimal::new(4, 4), Decimal::new(16, 4)),
        ("o4-mini", Decimal::new(11, 4), Decimal::new(44, 4)),
        ("gpt-image-1", Decimal::new(50, 4), Decimal::new(400, 4)),
    ]
    .into_iter()
    .map(|(model_id, input, output)| ModelCost {
        id: 0,
        model_id: model_id.to_string(),
        input_cost_per_1k_tokens: input,
        output_cost_per_1k_tokens: output,
        updated_at: now,
    })
    .collect()
}

/// Cost of one call: `prompt/1000 * input_rate + completion/1000 * output_rate`,
/// rounded to the ledger's six decimal places.
pub fn compute_cost(cost: &ModelCost, prompt_tokens: i32, completion_tokens: i32) -> Decimal {
    let per_1k = Decimal::new(1000, 0);
    let prompt_cost = Decimal::from(prompt_tokens) / per_1k * cost.input_cost_per_1k_tokens;
    let completion_cost =
        Decimal::from(completion_tokens) / per_1k * cost.output_cost_per_1k_tokens;

    (prompt_cost + completion_cost).round_dp(6)
}
