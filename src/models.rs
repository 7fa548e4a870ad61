// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declares a closed set of form options that serialize as their display label.
macro_rules! catalog {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.label()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

catalog!(
    /// Post topic.
    Category {
        Travel => "Du lịch",
        Food => "Ẩm thực",
        Love => "Tình yêu",
        Family => "Gia đình",
        Friends => "Bạn bè",
        Work => "Công việc",
        Study => "Học tập",
        Fashion => "Thời trang",
        Beauty => "Làm đẹp",
        Health => "Sức khỏe",
        Sports => "Thể thao",
        Music => "Âm nhạc",
        Movies => "Phim ảnh",
        Books => "Sách",
        Pets => "Thú cưng",
        Nature => "Thiên nhiên",
        Life => "Cuộc sống",
        Business => "Kinh doanh",
        Technology => "Công nghệ",
        Festival => "Lễ hội",
    }
);

catalog!(
    ContentLength {
        Short => "Ngắn",
        Medium => "Trung bình",
        Long => "Dài",
    }
);

catalog!(
    WritingStyle {
        Humorous => "Hài hước",
        Reflective => "Sâu lắng",
        Inspirational => "Truyền cảm hứng",
        Romantic => "Lãng mạn",
        Professional => "Chuyên nghiệp",
        Friendly => "Thân thiện",
    }
);

catalog!(
    Language {
        Vietnamese => "Tiếng Việt",
        English => "English",
        Bilingual => "Song ngữ",
    }
);

catalog!(
    ImageStyle {
        Realistic => "Chân thực",
        Cinematic => "Điện ảnh",
        Cartoon => "Hoạt hình",
        Watercolor => "Màu nước",
        Minimalist => "Tối giản",
        Vintage => "Cổ điển",
    }
);

impl ContentLength {
    /// Approximate caption word range requested from the model.
    pub fn word_range(&self) -> (u32, u32) {
        match self {
            ContentLength::Short => (30, 60),
            ContentLength::Medium => (80, 150),
            ContentLength::Long => (200, 300),
        }
    }
}

/// Suggestions offered for the free-text emotion field.
pub const SPECIFIC_EMOTIONS: [&str; 50] = [
    "Hoài niệm",
    "Bình yên",
    "Hạnh phúc",
    "Vui vẻ",
    "Hào hứng",
    "Biết ơn",
    "Tự hào",
    "Lãng mạn",
    "Ngọt ngào",
    "Ấm áp",
    "Thư thái",
    "Tự do",
    "Phấn khởi",
    "Say mê",
    "Tò mò",
    "Bất ngờ",
    "Mong chờ",
    "Hy vọng",
    "Lạc quan",
    "Mạnh mẽ",
    "Quyết tâm",
    "Tự tin",
    "Trân trọng",
    "Yêu đời",
    "Thanh thản",
    "Mãn nguyện",
    "Nhẹ nhõm",
    "Xao xuyến",
    "Bồi hồi",
    "Man mác",
    "Buồn",
    "Cô đơn",
    "Nhớ nhung",
    "Tiếc nuối",
    "Trầm tư",
    "Suy tư",
    "Lắng đọng",
    "Mơ mộng",
    "Dịu dàng",
    "Tinh nghịch",
    "Hài hước",
    "Ngạc nhiên",
    "Cảm động",
    "Xúc động",
    "Bâng khuâng",
    "Háo hức",
    "Thỏa mãn",
    "Yên bình",
    "Da diết",
    "Thương nhớ",
];

/// All user-chosen options for one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub category: Category,
    #[serde(default)]
    pub emotion: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image_details: String,
    pub length: ContentLength,
    pub style: WritingStyle,
    pub language: Language,
    pub image_style: ImageStyle,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            category: Category::Travel,
            emotion: SPECIFIC_EMOTIONS[0].to_string(),
            author: String::new(),
            image_details: String::new(),
            length: ContentLength::Medium,
            style: WritingStyle::Reflective,
            language: Language::Vietnamese,
            image_style: ImageStyle::Realistic,
        }
    }
}

/// A partial form update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParamsPatch {
    pub category: Option<Category>,
    pub emotion: Option<String>,
    pub author: Option<String>,
    pub image_details: Option<String>,
    pub length: Option<ContentLength>,
    pub style: Option<WritingStyle>,
    pub language: Option<Language>,
    pub image_style: Option<ImageStyle>,
}

impl GenerationParams {
    /// Applies a patch and reports whether the author changed.
    pub fn apply(&mut self, patch: GenerationParamsPatch) -> bool {
        let mut author_changed = false;
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(emotion) = patch.emotion {
            self.emotion = emotion;
        }
        if let Some(author) = patch.author {
            author_changed = author != self.author;
            self.author = author;
        }
        if let Some(details) = patch.image_details {
            self.image_details = details;
        }
        if let Some(length) = patch.length {
            self.length = length;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(image_style) = patch.image_style {
            self.image_style = image_style;
        }
        author_changed
    }
}

/// Result of one generation. Replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub caption: String,
    pub hashtags: Vec<String>,
    pub image_url: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedContent {
    pub fn new(caption: String, hashtags: Vec<String>, image_url: Option<String>) -> Self {
        Self {
            caption,
            hashtags: normalize_hashtags(hashtags),
            image_url,
            generated_at: Utc::now(),
        }
    }
}

fn normalize_hashtags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t != "#")
        .map(|t| if t.starts_with('#') { t } else { format!("#{}", t) })
        .collect()
}

/// Option catalogs published to form clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    pub categories: Vec<&'static str>,
    pub emotions: Vec<&'static str>,
    pub lengths: Vec<&'static str>,
    pub styles: Vec<&'static str>,
    pub languages: Vec<&'static str>,
    pub image_styles: Vec<&'static str>,
    pub defaults: GenerationParams,
}

impl FormOptions {
    pub fn catalog() -> Self {
        Self {
            categories: Category::labels(),
            emotions: SPECIFIC_EMOTIONS.to_vec(),
            lengths: ContentLength::labels(),
            styles: WritingStyle::labels(),
            languages: Language::labels(),
            image_styles: ImageStyle::labels(),
            defaults: GenerationParams::default(),
        }
    }
}
