// src/llm/prompt.rs
// Compliance analysis prompt for one checklist

use std::fs;
use std::path::Path;

use crate::checklist::ChecklistItem;
use crate::error::{AnalyzerError, Result};

pub const DEFAULT_GLOSSARY: &str = "\
АБ — авиационная безопасность
САБ — служба авиационной безопасности
КЗА — контролируемая зона аэропорта
СЗ — стерильная зона
КПП — контрольно-пропускной пункт
ПДО — предполётный досмотр
ПАБ — программа авиационной безопасности аэропорта или авиакомпании
ВС — воздушное судно
ТСД — технические средства досмотра";

pub const DEFAULT_LEVELS: &str = "\
0 — соответствует требованиям
1 — незначительное несоответствие, не влияющее на уровень безопасности
2 — существенное несоответствие, требующее устранения в установленный срок
3 — критическое несоответствие, создающее угрозу авиационной безопасности";

/// Glossary and grading legend embedded into every analysis prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub glossary: String,
    pub levels: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            glossary: DEFAULT_GLOSSARY.to_string(),
            levels: DEFAULT_LEVELS.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Built-in texts, each optionally replaced by the contents of a file.
    pub fn load(glossary_file: Option<&Path>, levels_file: Option<&Path>) -> Result<Self> {
        let mut template = Self::default();

        if let Some(path) = glossary_file {
            template.glossary = read_text(path)?;
        }
        if let Some(path) = levels_file {
            template.levels = read_text(path)?;
        }

        Ok(template)
    }

    pub fn render(&self, items: &[ChecklistItem]) -> String {
        let rows = items
            .iter()
            .map(|item| {
                format!(
                    "- Категория: {} (код {}), Оценка: {}",
                    item.category, item.code, item.grade
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Ты эксперт по авиационной безопасности, проверяющий авиакомпании.
Используй следующие расшифровки:

{glossary}

Уровни соответствия / несоответствия:
{levels}

Вот результаты конкретной проверки (чеклист):

{rows}

Твоя задача:
1. Дай конкретные рекомендации по устранению несоответствий для этой проверки.
2. Проанализируй тенденции по выявленным позициям (если они повторяются или связаны).
3. Составь сводный вывод о состоянии авиационной безопасности объекта по разделам.

ВАЖНО: Форматируй ответ БЕЗ markdown разметки. Используй только обычный текст, разделенный на параграфы.
Не используй символы *, #, **, _, и другие markdown элементы.
Структурируй текст через переносы строк и отступы.
"#,
            glossary = self.glossary.trim(),
            levels = self.levels.trim(),
        )
    }
}

fn read_text(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|source| AnalyzerError::PromptFile {
        path: path.display().to_string(),
        source,
    })?;

    if text.trim().is_empty() {
        return Err(AnalyzerError::Config(format!("{} is empty", path.display())));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn renders_one_line_per_item_in_order() {
        let items = vec![
            ChecklistItem::new("Досмотр пассажиров", 101, 2),
            ChecklistItem::new("Охрана ВС", 102, 1),
        ];
        let prompt = PromptTemplate::default().render(&items);

        let first = prompt
            .find("- Категория: Досмотр пассажиров (код 101), Оценка: 2")
            .unwrap();
        let second = prompt.find("- Категория: Охрана ВС (код 102), Оценка: 1").unwrap();
        assert!(first < second);
    }

    #[test]
    fn embeds_glossary_and_legend() {
        let template = PromptTemplate {
            glossary: "ZZZ — тестовая расшифровка".to_string(),
            levels: "9 — тестовый уровень".to_string(),
        };
        let prompt = template.render(&[ChecklistItem::new("Раздел", 1, 0)]);

        assert!(prompt.contains("ZZZ — тестовая расшифровка"));
        assert!(prompt.contains("9 — тестовый уровень"));
        assert!(prompt.contains("БЕЗ markdown"));
    }

    #[test]
    fn loads_overrides_from_files() {
        let mut glossary = tempfile::NamedTempFile::new().unwrap();
        writeln!(glossary, "АБ — своя расшифровка").unwrap();

        let template = PromptTemplate::load(Some(glossary.path()), None).unwrap();
        assert_eq!(template.glossary.trim(), "АБ — своя расшифровка");
        assert_eq!(template.levels, DEFAULT_LEVELS);
    }

    #[test]
    fn missing_or_empty_file_is_a_configuration_error() {
        let missing = Path::new("/nonexistent/glossary.txt");
        assert!(matches!(
            PromptTemplate::load(Some(missing), None),
            Err(AnalyzerError::PromptFile { .. })
        ));

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            PromptTemplate::load(None, Some(empty.path())),
            Err(AnalyzerError::Config(_))
        ));
    }
}
