//! Inline-mode search: `<transport word> <text>` typed after the bot's name.

use crate::catalog::{Catalog, CatalogRegistry};
use crate::domain::{Mode, StopIndex, keyword};
use crate::menu::Button;
use crate::resolve::{is_number, match_by_name, match_by_number};
use crate::token::{Origin, Token};

use super::update::InlineAnswer;

/// Most results an inline answer may carry.
pub const MAX_INLINE_RESULTS: usize = 50;

const REFRESH: &str = "🔃 Actualizar 🔃";

/// Answers for an inline query. Anything that isn't a transport word
/// followed by search text gets no results.
pub async fn answers(catalogs: &CatalogRegistry, query: &str) -> Vec<InlineAnswer> {
    let mut words = query.split_whitespace();
    let Some(mode) = words.next().and_then(|w| Mode::from_command(&keyword(w))) else {
        return Vec::new();
    };
    let terms: Vec<&str> = words.collect();
    let Some(first) = terms.first() else {
        return Vec::new();
    };

    let catalog = catalogs.snapshot(mode).await;
    if mode.accepts_number() && terms.len() == 1 && is_number(first) {
        return match_by_number(&catalog, first)
            .and_then(|index| answer(&catalog, index))
            .into_iter()
            .collect();
    }

    match_by_name(&catalog, &terms, Origin::Inline)
        .into_iter()
        .filter_map(|m| answer(&catalog, m.index))
        .take(MAX_INLINE_RESULTS)
        .collect()
}

fn answer(catalog: &Catalog, index: StopIndex) -> Option<InlineAnswer> {
    let mode = catalog.mode();
    let display = catalog.display_name(index)?;
    let token = Token::StopTime {
        mode,
        index,
        origin: Origin::Inline,
    };
    let what = if mode == Mode::Bikeshare {
        format!("estadísticas de {} {display}", mode.stop_noun())
    } else {
        format!("tiempos en {} {display}", mode.stop_noun())
    };
    Some(InlineAnswer {
        id: token.encode(),
        mode,
        title: capitalize(&what),
        placeholder: format!("Recopilando {what}"),
        keyboard: vec![vec![Button::new(REFRESH, &token)]],
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::catalog::RawStop;

    async fn registry() -> CatalogRegistry {
        let catalogs = CatalogRegistry::new(HashMap::new());
        catalogs
            .load(
                Mode::Metro,
                &[
                    RawStop::new("Sol", "m1"),
                    RawStop::new("Príncipe Pío", "m2"),
                    RawStop::new("Príncipe de Vergara", "m3"),
                ],
            )
            .await;
        catalogs
            .load(
                Mode::BusUrban,
                &[
                    RawStop::new("Aluche", "EMT_658"),
                    RawStop::new("Plaza 658", "EMT_1"),
                ],
            )
            .await;
        let many: Vec<RawStop> = (0..80)
            .map(|i| RawStop::new(format!("Calle {i}"), format!("CRTM_par_8_{}", 1000 + i)))
            .collect();
        catalogs.load(Mode::BusInterurban, &many).await;
        catalogs
    }

    #[tokio::test]
    async fn name_search_yields_inline_tokens() {
        let catalogs = registry().await;
        let results = answers(&catalogs, "Metro príncipe").await;
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["time_inline_metro_1", "time_inline_metro_2"]);
        assert_eq!(results[0].title, "Tiempos en estación Príncipe Pío");
        assert_eq!(results[0].placeholder, "Recopilando tiempos en estación Príncipe Pío");
        assert_eq!(results[0].keyboard[0][0].data, "time_inline_metro_1");
    }

    #[tokio::test]
    async fn number_search_for_bus() {
        let catalogs = registry().await;
        let results = answers(&catalogs, "emt 658").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "time_inline_emt_0");
        assert_eq!(results[0].title, "Tiempos en parada Aluche (658)");
    }

    #[tokio::test]
    async fn results_are_capped() {
        let catalogs = registry().await;
        let results = answers(&catalogs, "interurbano calle").await;
        assert_eq!(results.len(), MAX_INLINE_RESULTS);
    }

    #[tokio::test]
    async fn incomplete_or_unknown_queries() {
        let catalogs = registry().await;
        assert!(answers(&catalogs, "").await.is_empty());
        assert!(answers(&catalogs, "metro").await.is_empty());
        assert!(answers(&catalogs, "tranvia sol").await.is_empty());
        assert!(answers(&catalogs, "metro zzz").await.is_empty());
    }

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(capitalize("estadísticas de estación Casal"), "Estadísticas de estación Casal");
        assert_eq!(capitalize(""), "");
    }
}
