//! Deterministic model that applies the tool-selection policy by pattern.
//!
//! Used when no API key is configured and by tests that need routing without
//! a network. Direct answers come from a small built-in FAQ.

use serde_json::{json, Value};

use portside_core::domain::outcome::ToolOutcome;

use crate::llm::{
    DecisionRequest, InvocationResult, LanguageModelClient, ModelDecision, ModelError,
    SynthesisRequest, ToolInvocation,
};
use crate::support_tools::{CHECK_ORDER_STATUS, GET_TRACKING_INFO};

const CONTAINER_PREFIX: &str = "MAEU";
const CONTAINER_DIGITS: usize = 7;

struct FaqEntry {
    keywords: &'static [&'static str],
    answer: &'static str,
}

const FAQ: &[FaqEntry] = &[
    FaqEntry {
        keywords: &["return", "refund"],
        answer: "Returns need a Return Authorization Number, which our support team issues \
                 within one business day of your request. Goods must be unused and in their \
                 original packaging, and refunds are processed within 14 days of inspection.",
    },
    FaqEntry {
        keywords: &["dangerous", "hazardous", "imo"],
        answer: "Yes, we ship dangerous goods in IMO classes 1 through 9 subject to approval. \
                 Please submit a Dangerous Goods Declaration and the Material Safety Data Sheet \
                 at least 72 hours before the cargo cut-off.",
    },
    FaqEntry {
        keywords: &["document", "paperwork", "customs"],
        answer: "International shipments need a commercial invoice, a packing list and a bill \
                 of lading. Depending on the destination you may also need a certificate of \
                 origin and import licences.",
    },
    FaqEntry {
        keywords: &["payment", "pay", "invoice"],
        answer: "We accept bank transfer and major credit cards. Invoices are due within 30 \
                 days, and freight must be paid before cargo release at destination.",
    },
    FaqEntry {
        keywords: &["insurance", "damage", "claim"],
        answer: "Cargo insurance is available at booking. Damage claims must be filed within \
                 7 days of delivery with photos and the delivery receipt.",
    },
];

const FALLBACK_ANSWER: &str = "I can check an order by its ID (ORD-XXXX), track a container \
                               (MAEU followed by 7 digits), or answer questions about our \
                               shipping policies. How can I help?";

#[derive(Debug, Default)]
pub struct PolicyRoutingModel;

impl PolicyRoutingModel {
    fn route(&self, request: &DecisionRequest) -> ModelDecision {
        let offered = |name: &str| request.catalog.iter().any(|entry| entry.name() == name);
        let mut invocations = Vec::new();

        if let Some(order_id) =
            find_order_id(&request.question).filter(|_| offered(CHECK_ORDER_STATUS))
        {
            invocations.push(invocation(
                invocations.len(),
                CHECK_ORDER_STATUS,
                json!({"order_id": order_id}),
            ));
        }
        if let Some(container) =
            find_container_number(&request.question).filter(|_| offered(GET_TRACKING_INFO))
        {
            invocations.push(invocation(
                invocations.len(),
                GET_TRACKING_INFO,
                json!({"container_number": container}),
            ));
        }

        if invocations.is_empty() {
            ModelDecision::Answer(faq_answer(&request.question).to_string())
        } else {
            ModelDecision::Invoke(invocations)
        }
    }
}

#[async_trait::async_trait]
impl LanguageModelClient for PolicyRoutingModel {
    async fn decide(&self, request: &DecisionRequest) -> Result<ModelDecision, ModelError> {
        Ok(self.route(request))
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, ModelError> {
        if request.results.is_empty() {
            return Ok(faq_answer(&request.question).to_string());
        }

        let sentences = request.results.iter().map(describe).collect::<Vec<_>>();
        Ok(sentences.join(" "))
    }
}

fn invocation(index: usize, name: &str, arguments: Value) -> ToolInvocation {
    ToolInvocation {
        call_id: format!("offline_call_{}", index + 1),
        name: name.to_string(),
        arguments,
    }
}

/// First `ORD-` followed by digits, case-insensitive, normalized to upper case.
fn find_order_id(question: &str) -> Option<String> {
    let upper = question.to_ascii_uppercase();
    upper.match_indices("ORD-").find_map(|(start, _)| {
        let digits = leading_digits(&upper[start + 4..]);
        (!digits.is_empty()).then(|| format!("ORD-{digits}"))
    })
}

/// First `MAEU` followed by exactly seven digits.
fn find_container_number(question: &str) -> Option<String> {
    let upper = question.to_ascii_uppercase();
    upper.match_indices(CONTAINER_PREFIX).find_map(|(start, _)| {
        let digits = leading_digits(&upper[start + CONTAINER_PREFIX.len()..]);
        (digits.len() == CONTAINER_DIGITS).then(|| format!("{CONTAINER_PREFIX}{digits}"))
    })
}

fn leading_digits(text: &str) -> &str {
    let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    &text[..end]
}

fn faq_answer(question: &str) -> &'static str {
    let lower = question.to_lowercase();
    FAQ.iter()
        .find(|entry| entry.keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|entry| entry.answer)
        .unwrap_or(FALLBACK_ANSWER)
}

fn describe(result: &InvocationResult) -> String {
    match &result.outcome {
        ToolOutcome::Found { payload } => match result.invocation.name.as_str() {
            CHECK_ORDER_STATUS => format!(
                "Good news! Order {} for {} is currently {}. It shipped from {} on {} and is \
                 expected to arrive in {} by {}.",
                field(payload, "order_id"),
                field(payload, "customer_name"),
                field(payload, "status"),
                field(payload, "origin_port"),
                field(payload, "shipped_date"),
                field(payload, "destination_port"),
                field(payload, "estimated_delivery"),
            ),
            GET_TRACKING_INFO => format!(
                "Container {} (order {}) is {}: {}. Estimated delivery is {}.",
                field(payload, "container_number"),
                field(payload, "order_id"),
                field(payload, "status"),
                field(payload, "current_location"),
                field(payload, "estimated_delivery"),
            ),
            other => format!("Here is what I found with {other}: {payload}."),
        },
        ToolOutcome::NotFound { message } => {
            format!("I'm sorry, I couldn't find that. {message}")
        }
        ToolOutcome::Failed { error, .. } => format!(
            "I ran into a problem while looking that up ({error}). Please try again shortly or \
             contact our support team."
        ),
    }
}

fn field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(Value::as_str).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use portside_core::domain::outcome::ToolOutcome;

    use super::{find_container_number, find_order_id, PolicyRoutingModel, FALLBACK_ANSWER};
    use crate::llm::{
        DecisionRequest, InvocationResult, LanguageModelClient, ModelDecision, SynthesisRequest,
        ToolInvocation,
    };
    use crate::tools::{CatalogEntry, ToolDescriptor};

    fn request(question: &str) -> DecisionRequest {
        DecisionRequest {
            question: question.to_string(),
            catalog: vec![
                CatalogEntry::Function(ToolDescriptor::new("check_order_status", "orders")),
                CatalogEntry::Function(ToolDescriptor::new("get_tracking_info", "tracking")),
                CatalogEntry::Retrieval,
            ],
            policy: String::new(),
        }
    }

    #[test]
    fn identifiers_are_extracted_by_pattern() {
        assert_eq!(find_order_id("status of ord-1005?"), Some("ORD-1005".to_string()));
        assert_eq!(find_order_id("ORD- is not an id"), None);
        assert_eq!(find_container_number("Track MAEU7654321 please"), Some("MAEU7654321".to_string()));
        assert_eq!(find_container_number("MAEU123456 is too short"), None);
        assert_eq!(find_container_number("MAEU12345678 is too long"), None);
    }

    #[tokio::test]
    async fn order_and_container_questions_route_to_their_tools() {
        let model = PolicyRoutingModel;

        let order =
            model.decide(&request("When will order ORD-1010 be delivered?")).await.expect("decide");
        let ModelDecision::Invoke(calls) = order else { panic!("expected invocation") };
        assert_eq!(calls[0].name, "check_order_status");
        assert_eq!(calls[0].arguments, json!({"order_id": "ORD-1010"}));

        let tracking =
            model.decide(&request("Can you track container MAEU7654321?")).await.expect("decide");
        let ModelDecision::Invoke(calls) = tracking else { panic!("expected invocation") };
        assert_eq!(calls[0].name, "get_tracking_info");
    }

    #[tokio::test]
    async fn general_questions_are_answered_directly() {
        let model = PolicyRoutingModel;

        let decision = model.decide(&request("Do you ship dangerous goods?")).await.expect("decide");
        let ModelDecision::Answer(answer) = decision else { panic!("expected direct answer") };
        assert!(answer.contains("dangerous goods"));

        let decision = model.decide(&request("Hello there")).await.expect("decide");
        assert_eq!(decision, ModelDecision::Answer(FALLBACK_ANSWER.to_string()));
    }

    #[tokio::test]
    async fn tools_missing_from_catalog_are_not_requested() {
        let mut request = request("Where is ORD-1005?");
        request.catalog = vec![CatalogEntry::Retrieval];

        let decision = PolicyRoutingModel.decide(&request).await.expect("decide");
        assert!(matches!(decision, ModelDecision::Answer(_)));
    }

    #[tokio::test]
    async fn synthesis_explains_not_found_politely() {
        let answer = PolicyRoutingModel
            .synthesize(&SynthesisRequest {
                question: "Where is ORD-9999?".to_string(),
                results: vec![InvocationResult {
                    invocation: ToolInvocation {
                        call_id: "offline_call_1".to_string(),
                        name: "check_order_status".to_string(),
                        arguments: json!({"order_id": "ORD-9999"}),
                    },
                    outcome: ToolOutcome::not_found(
                        "Order ORD-9999 not found in our system. Please verify the order ID.",
                    ),
                }],
                instruction: String::new(),
            })
            .await
            .expect("synthesize");

        assert!(answer.starts_with("I'm sorry"));
        assert!(answer.contains("ORD-9999"));
    }
}
