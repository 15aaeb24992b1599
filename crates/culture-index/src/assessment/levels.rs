use serde::Serialize;

/// Inclusive band of total scores mapped to a maturity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRange {
    pub min: i64,
    pub max: i64,
    pub key: &'static str,
    pub description_html: &'static str,
    pub description_text: &'static str,
}

impl ScoreRange {
    pub const fn contains(&self, total: i64) -> bool {
        total >= self.min && total <= self.max
    }
}

/// Maturity levels in ascending score order. Bands are disjoint and contiguous.
pub static LEVELS: [ScoreRange; 5] = [
    ScoreRange {
        min: 10,
        max: 17,
        key: "Cultura de Emergência Crítica",
        description_html: "<p>A cultura da sua empresa opera em modo de sobrevivência.</p>\n<p>As decisões são reativas e focadas em manter a operação funcionando.</p>\n<p>Não existe base estável para crescimento.</p>",
        description_text: "A cultura da sua empresa opera em modo de sobrevivência. As decisões são reativas e focadas em manter a operação funcionando. Não existe base estável para crescimento.",
    },
    ScoreRange {
        min: 18,
        max: 25,
        key: "Cultura da Instabilidade Crônica",
        description_html: "<p>A empresa opera em ciclos de altos e baixos.</p>\n<p>Os resultados aparecem, mas não se sustentam.</p>",
        description_text: "A empresa opera em ciclos de altos e baixos. Os resultados aparecem, mas não se sustentam.",
    },
    ScoreRange {
        min: 26,
        max: 33,
        key: "Cultura de Fortalecimento Estrutural",
        description_html: "<p>A empresa está fortalecendo sua base cultural.</p>\n<p>Já existem padrões, mas ainda há dependência de cobrança.</p>",
        description_text: "A empresa está fortalecendo sua base cultural. Já existem padrões, mas ainda há dependência de cobrança.",
    },
    ScoreRange {
        min: 34,
        max: 41,
        key: "Cultura de Estabilidade Orgânica",
        description_html: "<p>A cultura já sustenta a operação com autonomia.</p>\n<p>O crescimento acontece com previsibilidade.</p>",
        description_text: "A cultura já sustenta a operação com autonomia. O crescimento acontece com previsibilidade.",
    },
    ScoreRange {
        min: 42,
        max: 50,
        key: "Cultura de Expansão e Escalabilidade",
        description_html: "<p>A cultura é um motor de crescimento.</p>\n<p>Alta performance, atração de talentos e escala.</p>",
        description_text: "A cultura é um motor de crescimento. Alta performance, atração de talentos e escala.",
    },
];

/// Highest attainable total, used when rendering "N de 50 pontos".
pub const MAX_SCORE: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("total score {total} is outside the expected range {min}..={max}")]
    ScoreOutOfRange { total: i64, min: i64, max: i64 },
}

/// Returns the first level whose bounds contain `total`.
pub fn classify(total: i64) -> Result<&'static ScoreRange, ClassificationError> {
    LEVELS
        .iter()
        .find(|range| range.contains(total))
        .ok_or(ClassificationError::ScoreOutOfRange {
            total,
            min: LEVELS[0].min,
            max: MAX_SCORE,
        })
}
