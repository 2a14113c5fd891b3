//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The matching arithmetic itself: given an incoming order's remaining quantity and an
// ordered list of candidate counterparties (already in price-time priority, already
// loaded from the store), walk the list and generate fills until the incoming order is
// exhausted or the candidates run out.
//
// CRITICAL PROPERTY: this function is deterministic and has no side effects — it does
// not touch the book, the store, or the clock beyond what it's handed. Persisting the
// resulting fills as `Match` rows and `Order` status transitions is the processor's
// job (`src/processor`), not this one's. Keeping the arithmetic pure makes it testable
// without a store or a book.
//--------------------------------------------------------------------------------------------------

/// One candidate counterparty as the engine needs to see it: its id and how much
/// quantity it has left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub order_id: String,
    pub remaining_quantity: i64,
}

/// One fill against a single counterparty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub counterparty_id: String,
    pub quantity: i64,
    /// The counterparty's remaining quantity after this fill.
    pub counterparty_remaining: i64,
}

/// The result of walking the candidate list against one incoming order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchOutcome {
    pub fills: Vec<Fill>,
    pub remaining_quantity: i64,
}

impl MatchOutcome {
    pub fn fully_matched(&self) -> bool {
        self.remaining_quantity == 0
    }

    pub fn any_match(&self) -> bool {
        !self.fills.is_empty()
    }
}

/// Walks the candidate list in order: while the incoming order still has quantity
/// left, fills `min(remaining, candidate.remaining)`, records a fill,
/// and move to the next candidate once the current one is exhausted or the incoming
/// order is. Candidates are consumed in the order given — callers are responsible for
/// handing them over in price-time priority (`OrderBook::candidates`).
pub fn run_match(incoming_quantity: i64, candidates: &[Candidate]) -> MatchOutcome {
    let mut remaining = incoming_quantity;
    let mut fills = Vec::new();

    for candidate in candidates {
        if remaining <= 0 {
            break;
        }
        let matched = remaining.min(candidate.remaining_quantity);
        if matched <= 0 {
            continue;
        }
        remaining -= matched;
        fills.push(Fill {
            counterparty_id: candidate.order_id.clone(),
            quantity: matched,
            counterparty_remaining: candidate.remaining_quantity - matched,
        });
    }

    MatchOutcome {
        fills,
        remaining_quantity: remaining,
    }
}
