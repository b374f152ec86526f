use bigdecimal::{BigDecimal, Zero};

use crate::types::{Operation, OperationType, PositionShares, TokenInfo, TokenTag};

pub fn add_tracked_underlying_tag(mut tokens: Vec<TokenInfo>) -> Vec<TokenInfo> {
    for token in &mut tokens {
        token.tag = Some(TokenTag::TrackedUnderlying);
    }
    tokens
}

/// First token among inputs then outputs whose address is the share token.
pub fn find_share_token<'a>(
    input_tokens: &'a [TokenInfo],
    output_tokens: &'a [TokenInfo],
    shares_identifier: &str,
) -> Option<&'a TokenInfo> {
    input_tokens
        .iter()
        .chain(output_tokens.iter())
        .find(|token| token.address == shares_identifier)
}

pub fn extract_position_shares_default_strategy(
    input_tokens: &[TokenInfo],
    output_tokens: &[TokenInfo],
    shares_identifier: &str,
) -> PositionShares {
    match find_share_token(input_tokens, output_tokens, shares_identifier) {
        Some(shares) => PositionShares::priced(shares.address.clone(), shares.price_usd),
        None => PositionShares::nil(shares_identifier),
    }
}

/// Builds the operation, signing the share delta by direction.
pub fn extract_operation_default_strategy(
    input_tokens: Vec<TokenInfo>,
    output_tokens: Vec<TokenInfo>,
    shares_identifier: &str,
    operation_type: OperationType,
) -> Operation {
    let share_amount_delta = find_share_token(&input_tokens, &output_tokens, shares_identifier)
        .map(|shares| match operation_type {
            OperationType::Withdraw | OperationType::TransferOut => -shares.amount.clone(),
            OperationType::Deposit | OperationType::TransferIn => shares.amount.clone(),
            OperationType::NullOp => BigDecimal::zero(),
        })
        .unwrap_or_else(BigDecimal::zero);

    Operation {
        operation_type,
        input_tokens,
        output_tokens,
        share_amount_delta,
    }
}
