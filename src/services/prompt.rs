// src/services/prompt.rs
use crate::models::{GenerationParams, ImageStyle, Language};
use crate::watermark::normalize_handle;

pub const SYSTEM_PROMPT: &str = "You are SoulCaption, a Vietnamese social media copywriter. \
You write Facebook captions that feel personal and sincere, and pick hashtags that \
real Vietnamese users search for. Always answer with a single JSON object.";

/// Builds the caption request sent to the text model.
pub fn caption_prompt(params: &GenerationParams) -> String {
    let (min_words, max_words) = params.length.word_range();
    let emotion = if params.emotion.trim().is_empty() {
        "tự nhiên"
    } else {
        params.emotion.trim()
    };

    let mut prompt = format!(
        "Viết một caption Facebook về chủ đề \"{category}\".\n\
         - Cảm xúc chủ đạo: {emotion}\n\
         - Giọng văn: {style}\n\
         - Độ dài: {length} (khoảng {min_words}-{max_words} từ)\n\
         - Ngôn ngữ: {language}\n",
        category = params.category,
        style = params.style,
        length = params.length,
        language = language_instruction(params.language),
    );

    if let Some(handle) = normalize_handle(&params.author) {
        prompt.push_str(&format!("- Ký tên tác giả ở cuối bài: {}\n", handle));
    }

    if !params.image_details.trim().is_empty() {
        prompt.push_str(&format!(
            "- Bài viết đi kèm một bức ảnh có: {}\n",
            params.image_details.trim()
        ));
    }

    prompt.push_str(
        "\nTrả về JSON dạng {\"caption\": \"...\", \"hashtags\": [\"#...\"]} \
         với 5 đến 8 hashtag liên quan.",
    );
    prompt
}

/// Builds the English scene description sent to the image model.
pub fn image_prompt(params: &GenerationParams) -> String {
    let mut prompt = format!(
        "{style}, a scene about {category} in Southern Vietnam",
        style = image_style_phrase(params.image_style),
        category = params.category,
    );

    if !params.emotion.trim().is_empty() {
        prompt.push_str(&format!(", evoking a feeling of \"{}\"", params.emotion.trim()));
    }

    if !params.image_details.trim().is_empty() {
        prompt.push_str(&format!(", featuring {}", params.image_details.trim()));
    }

    prompt.push_str(", natural lighting, highly detailed, no text, no watermark");
    prompt
}

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::Vietnamese => "tiếng Việt",
        Language::English => "tiếng Anh",
        Language::Bilingual => "song ngữ Việt - Anh, tiếng Việt trước",
    }
}

fn image_style_phrase(style: ImageStyle) -> &'static str {
    match style {
        ImageStyle::Realistic => "Photorealistic photograph",
        ImageStyle::Cinematic => "Cinematic film still, teal and orange grading",
        ImageStyle::Cartoon => "Colorful cartoon illustration",
        ImageStyle::Watercolor => "Soft watercolor painting",
        ImageStyle::Minimalist => "Minimalist composition with pastel tones",
        ImageStyle::Vintage => "Vintage film photograph with warm grain",
    }
}
