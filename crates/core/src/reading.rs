//! Reading-request assembly, prompt building, and result rendering.
//!
//! A [`ReadingRequest`] pairs a stored intent with the cards the user
//! actually turned over. It is immutable once built and feeds exactly one
//! generation job.

use pulldown_cmark::{html, Parser};
use serde::{Deserialize, Serialize};

use crate::deck::Orientation;
use crate::error::CoreError;
use crate::intent::{CardCount, StoredIntent};

/// A card the user turned over on the draw page.
///
/// The page submits `{name, value}` where `value` is the orientation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChosenCard {
    pub name: String,
    #[serde(rename = "value")]
    pub orientation: Orientation,
}

/// Everything one generation job needs: the sanitized intention, the
/// requested count, and the chosen cards in draw order. Single use.
#[derive(Debug, Clone)]
pub struct ReadingRequest {
    pub intention: String,
    pub card_count: CardCount,
    pub cards: Vec<ChosenCard>,
}

impl ReadingRequest {
    /// Pair a stored intent with the chosen cards, validating the count.
    pub fn new(intent: StoredIntent, cards: Vec<ChosenCard>) -> Result<Self, CoreError> {
        validate_chosen_cards(&cards, intent.card_count)?;
        Ok(Self {
            intention: intent.intention,
            card_count: intent.card_count,
            cards,
        })
    }
}

/// Check the chosen cards against the requested count.
pub fn validate_chosen_cards(
    cards: &[ChosenCard],
    card_count: CardCount,
) -> Result<(), CoreError> {
    if cards.len() != card_count.as_usize() {
        return Err(CoreError::Validation(format!(
            "Expected {} chosen cards, got {}",
            card_count.as_usize(),
            cards.len()
        )));
    }
    if cards.iter().any(|c| c.name.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Chosen card with empty name".to_string(),
        ));
    }
    Ok(())
}

/// Build the generation prompt for a full reading.
///
/// Embeds the intention and every card with its orientation; the model is
/// asked to answer in markdown, which [`render_reading`] later converts.
pub fn build_reading_prompt(request: &ReadingRequest) -> String {
    let mut cards = String::new();
    for (i, card) in request.cards.iter().enumerate() {
        cards.push_str(&format!(
            "Carta {}: {} ({})\n",
            i + 1,
            card.name,
            card.orientation
        ));
    }

    format!(
        "Você é uma tarologa experiente e acolhedora. Uma pessoa consulta o \
         tarot com a seguinte intenção: \"{intention}\"\n\n\
         Ela tirou {count} carta(s) dos arcanos maiores:\n{cards}\n\
         Faça uma leitura de tarot interpretando cada carta na posição em que \
         saiu (normal ou invertido) e relacione as cartas com a intenção da \
         pessoa. Termine com uma síntese da mensagem geral das cartas. \
         Responda em português, em markdown, sem repetir a pergunta.",
        intention = request.intention,
        count = request.card_count,
        cards = cards,
    )
}

/// Build the follow-up chat prompt, using the prior reading as context.
pub fn build_chat_prompt(message: &str, prior_reading: &str) -> String {
    format!(
        "Você é uma tarologa experiente conversando sobre uma leitura de \
         tarot que acabou de fazer. A leitura foi:\n\n{prior_reading}\n\n\
         A pessoa pergunta: \"{message}\"\n\n\
         Responda de forma breve e acolhedora, em português, apoiando-se na \
         leitura acima.",
    )
}

/// Render generated markdown to sanitized HTML for the results page.
pub fn render_reading(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(markdown));
    ammonia::clean(&out)
}
