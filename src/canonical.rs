//! Canonicalization: bilingual column renames, free-text normalization, and
//! the null-fill policy with the optional-metadata sentinel.

use crate::batch::Row;
use crate::coerce::coerce_cell;
use crate::schema::ColumnType;
use ahash::AHashMap;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

/// Static English -> Spanish field dictionary. Columns not listed here pass
/// through unchanged.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("id", "id"),
    ("title", "titulo"),
    ("selftext", "texto"),
    ("author", "autor"),
    ("author_fullname", "autor_nombre_completo"),
    ("author_premium", "autor_premium"),
    ("author_patreon_flair", "autor_patreon"),
    ("author_flair_text", "autor_flair_texto"),
    ("author_flair_css_class", "autor_flair_css"),
    ("author_flair_type", "autor_flair_tipo"),
    ("subreddit", "subreddit_nombre"),
    ("subreddit_id", "subreddit_id"),
    ("subreddit_name_prefixed", "subreddit_prefijado"),
    ("subreddit_type", "subreddit_tipo"),
    ("subreddit_subscribers", "subreddit_suscriptores"),
    ("created_utc", "fecha_creacion_utc"),
    ("created_ts", "fecha_creacion"),
    ("edited_bool", "editado"),
    ("edited_utc", "editado_fecha"),
    ("distinguished", "distinguido"),
    ("is_self", "es_texto"),
    ("over_18", "es_adulto"),
    ("spoiler", "es_spoiler"),
    ("locked", "esta_bloqueado"),
    ("archived", "archivado"),
    ("quarantine", "en_cuarentena"),
    ("stickied", "esta_fijado"),
    ("is_original_content", "es_original"),
    ("is_meta", "es_meta"),
    ("is_crosspostable", "es_compartible"),
    ("score", "puntaje"),
    ("ups", "votos_positivos"),
    ("downs", "votos_negativos"),
    ("upvote_ratio", "ratio_upvotes"),
    ("num_comments", "total_comentarios"),
    ("num_crossposts", "total_republicaciones"),
    ("view_count", "vistas"),
    ("visited", "visitado"),
    ("hide_score", "ocultar_puntaje"),
    ("send_replies", "enviar_respuestas"),
    ("can_mod_post", "puede_mod"),
    ("suggested_sort", "orden_sugerido"),
    ("domain", "dominio"),
    ("url", "url"),
    ("url_overridden_by_dest", "url_destino"),
    ("permalink", "enlace_permanente"),
    ("thumbnail", "miniatura"),
    ("thumbnail_height", "miniatura_alto"),
    ("thumbnail_width", "miniatura_ancho"),
    ("post_hint", "pista_contenido"),
    ("is_video", "es_video"),
    ("is_gallery", "es_galeria"),
    ("media_only", "solo_media"),
    ("media", "media_json"),
    ("secure_media", "media_segura_json"),
    ("media_embed", "media_embed_json"),
    ("secure_media_embed", "media_segura_embed_json"),
    ("preview", "previsualizacion_json"),
    ("gallery_data", "datos_galeria_json"),
    ("media_metadata", "metadatos_media_json"),
    ("link_flair_text", "flair_texto"),
    ("link_flair_css_class", "flair_css"),
    ("link_flair_type", "flair_tipo"),
    ("link_flair_richtext", "flair_richtext_json"),
    ("author_flair_richtext", "autor_flair_richtext_json"),
    ("crosspost_parent", "padre_republicacion"),
    ("crosspost_parent_list", "lista_republicaciones_json"),
    ("parent_whitelist_status", "estado_lista_blanca_padre"),
    ("whitelist_status", "estado_lista_blanca"),
    ("wls", "wls"),
    ("pwls", "pwls"),
    ("content_categories", "categorias_contenido_json"),
    ("discussion_type", "tipo_discusion"),
    ("treatment_tags", "etiquetas_tratamiento_json"),
    ("is_robot_indexable", "indexable_por_robot"),
    ("author_is_blocked", "autor_bloqueado"),
    ("awarders", "premiadores_json"),
    ("all_awardings", "premiaciones_json"),
    ("total_awards_received", "total_premios"),
    ("gilded", "gilded"),
    ("gildings", "gildings_json"),
    ("poll_data", "datos_encuesta_json"),
];

/// Canonical-name columns holding semantically-optional metadata: their nulls
/// become the literal sentinel instead of a type default, and the column is
/// forced to Str. These are optional fields, not malformed data.
pub const OPTIONAL_METADATA_COLUMNS: &[&str] = &[
    "editado_fecha",
    "distinguido",
    "vistas",
    "datos_galeria_json",
    "padre_republicacion",
    "estado_lista_blanca_padre",
    "estado_lista_blanca",
    "datos_encuesta_json",
    "tipo_discusion",
];

pub const NA_SENTINEL: &str = "NA";

/// Canonical name for one source column; unmapped names pass through.
pub fn canonical_name(col: &str) -> &str {
    COLUMN_RENAMES
        .iter()
        .find(|(from, _)| *from == col)
        .map(|(_, to)| *to)
        .unwrap_or(col)
}

/// Type default used by the null-fill pass. Null-resolved columns land as
/// empty strings.
pub fn default_for(ty: ColumnType) -> Value {
    match ty {
        ColumnType::Str | ColumnType::Null => Value::String(String::new()),
        ColumnType::Int => Value::from(0i64),
        ColumnType::Float => Value::from(0.0f64),
        ColumnType::Bool => Value::Bool(false),
    }
}

/// Free-text cleaner, compiled once per run.
pub struct TextCleaner {
    url: Regex,
    mention: Regex,
    spaces: Regex,
}

impl TextCleaner {
    pub fn new() -> Self {
        Self {
            url: Regex::new(r"https?://\S+").unwrap(),
            mention: Regex::new(r"(@\w+|/u/\w+|\bu/\w+)").unwrap(),
            spaces: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Lowercase, strip URLs and author mentions, collapse whitespace runs,
    /// trim. Empty input yields an empty string.
    pub fn clean(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let text = text.to_lowercase();
        let text = self.url.replace_all(&text, "");
        let text = self.mention.replace_all(&text, "");
        let text = self.spaces.replace_all(&text, " ");
        text.trim().to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the three canonicalization passes over the merged, deduplicated rows:
/// cleaned text copies, the static rename, and null-fill. Returns the
/// canonical schema; afterwards every output row carries every canonical
/// column.
pub fn canonicalize(
    rows: &mut Vec<Row>,
    resolved: &BTreeMap<String, ColumnType>,
    cleaner: &TextCleaner,
) -> BTreeMap<String, ColumnType> {
    // Cleaned copies are computed from the source-named text columns and
    // joined under their canonical names.
    for row in rows.iter_mut() {
        let titulo = cleaner.clean(str_cell(row, "title"));
        let texto = cleaner.clean(str_cell(row, "selftext"));
        row.insert("titulo_limpio".to_string(), Value::String(titulo));
        row.insert("texto_limpio".to_string(), Value::String(texto));
    }

    // Rename pass over schema and rows.
    let rename: AHashMap<&str, &str> = COLUMN_RENAMES.iter().copied().collect();
    let mut canonical_schema: BTreeMap<String, ColumnType> = BTreeMap::new();
    for (col, ty) in resolved {
        let name = rename.get(col.as_str()).copied().unwrap_or(col.as_str());
        let ty = if OPTIONAL_METADATA_COLUMNS.contains(&name) { ColumnType::Str } else { *ty };
        canonical_schema.insert(name.to_string(), ty);
    }
    canonical_schema.insert("titulo_limpio".to_string(), ColumnType::Str);
    canonical_schema.insert("texto_limpio".to_string(), ColumnType::Str);

    for row in rows.iter_mut() {
        let renamed: Row = std::mem::take(row)
            .into_iter()
            .map(|(col, val)| {
                let name = rename.get(col.as_str()).copied().map(str::to_string).unwrap_or(col);
                (name, val)
            })
            .collect();
        *row = renamed;
    }

    // Null-fill: every canonical column materialized in every row.
    for row in rows.iter_mut() {
        for (col, ty) in &canonical_schema {
            let is_optional = OPTIONAL_METADATA_COLUMNS.contains(&col.as_str());
            let replacement = match row.get(col.as_str()) {
                None | Some(Value::Null) => Some(if is_optional {
                    Value::String(NA_SENTINEL.to_string())
                } else {
                    default_for(*ty)
                }),
                Some(v) if is_optional && !v.is_string() => Some(coerce_cell(v, ColumnType::Str).0),
                _ => None,
            };
            if let Some(val) = replacement {
                row.insert(col.clone(), val);
            }
        }
    }

    canonical_schema
}

fn str_cell<'a>(row: &'a Row, col: &str) -> &'a str {
    row.get(col).and_then(|v| v.as_str()).unwrap_or("")
}
