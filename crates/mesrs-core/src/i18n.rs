//! Arabic/French localization.
//!
//! Every user-facing string lives in the [`Msg`] catalog as a French/Arabic
//! pair. Switching language only swaps text; numbers are formatted with the
//! locale's grouping through [`format_number`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Interface language. French is the default.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "ui_language", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    #[default]
    Fr,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::Fr => "fr",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "ar" => Some(Language::Ar),
            "fr" => Some(Language::Fr),
            _ => None,
        }
    }

    /// Picks the first supported language from an `Accept-Language` header,
    /// honouring `q` weights.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, usize, Language)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, part)| {
                let mut pieces = part.split(';');
                let language = Language::from_code(pieces.next()?)?;
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then_some((quality, position, language))
            })
            .collect();

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.first().map(|(_, _, language)| *language)
    }

    /// Query parameter first, then the request header, then the stored
    /// profile preference.
    pub fn resolve(
        query: Option<Language>,
        accept_language: Option<&str>,
        preferred: Option<Language>,
    ) -> Self {
        query
            .or_else(|| accept_language.and_then(Language::from_accept_language))
            .or(preferred)
            .unwrap_or_default()
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| format!("Unsupported language: {s}"))
    }
}

/// Catalog of user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Msg {
    // Page titles
    DashboardPage,
    UniversitiesPage,
    StudentsPage,
    TeachersPage,
    FormationsPage,
    EnrollmentsPage,
    ExamsPage,
    ScholarshipsPage,
    StatisticsPage,
    SettingsPage,
    AuthPage,
    UnauthorizedPage,

    // Headers
    Ministry,
    Country,

    // Stat cards
    TotalStudents,
    TotalTeachers,
    TotalUniversities,
    TotalFormations,
    PendingEnrollments,
    ActiveScholarships,

    // Auth
    SignInSuccess,
    SignUpSuccess,
    SignOutSuccess,
    ProfileUpdated,
    PasswordChanged,
    PasswordResetSent,
    PasswordResetDone,
    InvalidCredentials,
    AccountDisabled,
    EmailTaken,
    SessionExpired,
    InvalidResetToken,
    WrongCurrentPassword,
    AuthRequired,
    AccessDenied,

    // Generic
    LoadError,
    SystemUser,
}

impl Msg {
    pub fn text(self, language: Language) -> &'static str {
        let (fr, ar) = self.pair();
        match language {
            Language::Fr => fr,
            Language::Ar => ar,
        }
    }

    fn pair(self) -> (&'static str, &'static str) {
        match self {
            Msg::DashboardPage => ("Tableau de bord", "لوحة التحكم"),
            Msg::UniversitiesPage => ("Universités", "الجامعات"),
            Msg::StudentsPage => ("Étudiants", "الطلاب"),
            Msg::TeachersPage => ("Enseignants", "الأساتذة"),
            Msg::FormationsPage => ("Formations", "التكوينات"),
            Msg::EnrollmentsPage => ("Inscriptions", "التسجيلات"),
            Msg::ExamsPage => ("Examens", "الامتحانات"),
            Msg::ScholarshipsPage => ("Bourses", "المنح"),
            Msg::StatisticsPage => ("Statistiques", "الإحصائيات"),
            Msg::SettingsPage => ("Paramètres", "الإعدادات"),
            Msg::AuthPage => ("Connexion", "تسجيل الدخول"),
            Msg::UnauthorizedPage => ("Accès refusé", "غير مصرح"),

            Msg::Ministry => (
                "Ministère de l'Enseignement Supérieur et de la Recherche Scientifique",
                "وزارة التعليم العالي والبحث العلمي",
            ),
            Msg::Country => (
                "République Islamique de Mauritanie",
                "الجمهورية الإسلامية الموريتانية",
            ),

            Msg::TotalStudents => ("Total Étudiants", "مجموع الطلاب"),
            Msg::TotalTeachers => ("Corps Professoral", "الهيئة التدريسية"),
            Msg::TotalUniversities => ("Universités Actives", "الجامعات النشطة"),
            Msg::TotalFormations => ("Formations Disponibles", "التكوينات المتاحة"),
            Msg::PendingEnrollments => ("Inscriptions en attente", "التسجيلات المعلقة"),
            Msg::ActiveScholarships => ("Bourses Actives", "المنح النشطة"),

            Msg::SignInSuccess => ("Connexion réussie", "تم تسجيل الدخول بنجاح"),
            Msg::SignUpSuccess => ("Inscription réussie", "تم التسجيل بنجاح"),
            Msg::SignOutSuccess => ("Déconnexion réussie", "تم تسجيل الخروج بنجاح"),
            Msg::ProfileUpdated => ("Profil mis à jour", "تم تحديث الملف الشخصي"),
            Msg::PasswordChanged => ("Mot de passe modifié", "تم تغيير كلمة المرور"),
            Msg::PasswordResetSent => (
                "Si cet email existe, un lien de réinitialisation a été envoyé",
                "إذا كان هذا البريد موجوداً، فقد تم إرسال رابط إعادة التعيين",
            ),
            Msg::PasswordResetDone => (
                "Mot de passe réinitialisé",
                "تمت إعادة تعيين كلمة المرور",
            ),
            Msg::InvalidCredentials => (
                "Email ou mot de passe incorrect",
                "البريد الإلكتروني أو كلمة المرور غير صحيحة",
            ),
            Msg::AccountDisabled => ("Compte désactivé", "الحساب معطل"),
            Msg::EmailTaken => (
                "Cet email est déjà utilisé",
                "البريد الإلكتروني مستخدم بالفعل",
            ),
            Msg::SessionExpired => (
                "Session expirée, veuillez vous reconnecter",
                "انتهت صلاحية الجلسة، يرجى تسجيل الدخول مجدداً",
            ),
            Msg::InvalidResetToken => (
                "Lien de réinitialisation invalide ou expiré",
                "رابط إعادة التعيين غير صالح أو منتهي الصلاحية",
            ),
            Msg::WrongCurrentPassword => (
                "Mot de passe actuel incorrect",
                "كلمة المرور الحالية غير صحيحة",
            ),
            Msg::AuthRequired => ("Authentification requise", "المصادقة مطلوبة"),
            Msg::AccessDenied => ("Accès refusé", "تم رفض الوصول"),

            Msg::LoadError => (
                "Erreur lors du chargement des données",
                "خطأ في تحميل البيانات",
            ),
            Msg::SystemUser => ("Système", "النظام"),
        }
    }
}

const ARABIC_INDIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];
const FR_GROUP_SEPARATOR: char = '\u{202F}';
const AR_GROUP_SEPARATOR: char = '\u{066C}';

/// Formats an integer with the locale's digit shapes and thousands grouping.
///
/// French groups by three with a narrow no-break space; Arabic uses
/// Arabic-Indic digits with the Arabic thousands separator.
pub fn format_number(value: i64, language: Language) -> String {
    let digits = value.unsigned_abs().to_string();
    let separator = match language {
        Language::Fr => FR_GROUP_SEPARATOR,
        Language::Ar => AR_GROUP_SEPARATOR,
    };

    let mut out = String::with_capacity(digits.len() * 3);
    if value < 0 {
        out.push('-');
    }
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        match language {
            Language::Fr => out.push(ch),
            Language::Ar => {
                let d = ch.to_digit(10).unwrap_or(0) as usize;
                out.push(ARABIC_INDIC_DIGITS[d]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_grouping_uses_narrow_nbsp() {
        assert_eq!(format_number(0, Language::Fr), "0");
        assert_eq!(format_number(999, Language::Fr), "999");
        assert_eq!(format_number(1000, Language::Fr), "1\u{202F}000");
        assert_eq!(format_number(30270, Language::Fr), "30\u{202F}270");
        assert_eq!(format_number(1234567, Language::Fr), "1\u{202F}234\u{202F}567");
        assert_eq!(format_number(-4500, Language::Fr), "-4\u{202F}500");
    }

    #[test]
    fn arabic_uses_indic_digits() {
        assert_eq!(format_number(7, Language::Ar), "٧");
        assert_eq!(format_number(2156, Language::Ar), "٢\u{066C}١٥٦");
        assert_eq!(format_number(100000, Language::Ar), "١٠٠\u{066C}٠٠٠");
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code("fr-FR"), Some(Language::Fr));
        assert_eq!(Language::from_code("AR"), Some(Language::Ar));
        assert_eq!(Language::from_code("ar_MR"), Some(Language::Ar));
        assert_eq!(Language::from_code("en"), None);
        assert_eq!("ar".parse::<Language>(), Ok(Language::Ar));
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn accept_language_picks_best_supported() {
        assert_eq!(
            Language::from_accept_language("en-US,en;q=0.9,ar;q=0.8,fr;q=0.7"),
            Some(Language::Ar)
        );
        assert_eq!(
            Language::from_accept_language("fr;q=0.4, ar;q=0.9"),
            Some(Language::Ar)
        );
        assert_eq!(Language::from_accept_language("fr-FR"), Some(Language::Fr));
        assert_eq!(Language::from_accept_language("en, de"), None);
        assert_eq!(Language::from_accept_language("ar;q=0"), None);
    }

    #[test]
    fn resolution_order() {
        assert_eq!(
            Language::resolve(Some(Language::Ar), Some("fr"), Some(Language::Fr)),
            Language::Ar
        );
        assert_eq!(
            Language::resolve(None, Some("ar"), Some(Language::Fr)),
            Language::Ar
        );
        assert_eq!(
            Language::resolve(None, Some("en"), Some(Language::Ar)),
            Language::Ar
        );
        assert_eq!(Language::resolve(None, None, None), Language::Fr);
    }

    #[test]
    fn switching_language_changes_text_only() {
        let fr = Msg::TotalStudents.text(Language::Fr);
        let ar = Msg::TotalStudents.text(Language::Ar);
        assert_eq!(fr, "Total Étudiants");
        assert_eq!(ar, "مجموع الطلاب");
    }

    #[test]
    fn error_text_matches_client_wording() {
        assert_eq!(
            Msg::LoadError.text(Language::Fr),
            "Erreur lors du chargement des données"
        );
        assert_eq!(Msg::SystemUser.text(Language::Fr), "Système");
    }
}
