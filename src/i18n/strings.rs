/// All localized user-facing strings for a locale.
///
/// Every locale is a value of this struct, so a key present in the default
/// table cannot be missing from another table: the compiler rejects it.
#[derive(Debug, Clone)]
pub struct MessageStrings {
    // ==================== Control Labels ====================
    /// Idle label of the copy control
    pub copy: &'static str,

    /// Label while a copy is in flight
    pub copying: &'static str,

    /// Label while waiting for a retry
    /// Placeholders: {current}, {max}
    pub retrying: &'static str,

    /// Label shown until the success state resets
    pub copied: &'static str,

    /// Accessible description of the control
    pub copy_email_clipboard: &'static str,

    // ==================== Toasts ====================
    /// Success toast body
    pub success: &'static str,

    /// Short error title
    pub error: &'static str,

    /// Accessible label of a toast's close button
    pub close_notification: &'static str,

    // ==================== Failures ====================
    /// Validation failure reason
    pub invalid_email: &'static str,

    /// Validation failure shown to the user
    /// Placeholders: {reason}, {email}
    pub invalid_email_detail: &'static str,

    /// Reason used when clipboard access was refused
    pub permission_denied: &'static str,

    /// Reason used when a secure context is required
    pub https_required: &'static str,

    /// Reason used for any other failure
    pub fallback_copy: &'static str,

    /// Terminal failure shown after retries are exhausted
    /// Placeholders: {reason}, {email}
    pub copy_failed_manual: &'static str,

    // ==================== Announcements ====================
    /// Polite announcement for each scheduled retry
    /// Placeholders: {count}
    pub retry_attempt: &'static str,

    /// Polite announcement after a successful copy
    pub email_copied: &'static str,
}

/// Stable identifiers for every entry of [`MessageStrings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Copy,
    Copying,
    Retrying,
    Copied,
    CopyEmailClipboard,
    Success,
    Error,
    CloseNotification,
    InvalidEmail,
    InvalidEmailDetail,
    PermissionDenied,
    HttpsRequired,
    FallbackCopy,
    CopyFailedManual,
    RetryAttempt,
    EmailCopied,
}

impl MessageKey {
    pub const ALL: [MessageKey; 16] = [
        MessageKey::Copy,
        MessageKey::Copying,
        MessageKey::Retrying,
        MessageKey::Copied,
        MessageKey::CopyEmailClipboard,
        MessageKey::Success,
        MessageKey::Error,
        MessageKey::CloseNotification,
        MessageKey::InvalidEmail,
        MessageKey::InvalidEmailDetail,
        MessageKey::PermissionDenied,
        MessageKey::HttpsRequired,
        MessageKey::FallbackCopy,
        MessageKey::CopyFailedManual,
        MessageKey::RetryAttempt,
        MessageKey::EmailCopied,
    ];

    /// The key's name as used by the widget's original string tables.
    pub fn name(self) -> &'static str {
        match self {
            MessageKey::Copy => "copy",
            MessageKey::Copying => "copying",
            MessageKey::Retrying => "retrying",
            MessageKey::Copied => "copied",
            MessageKey::CopyEmailClipboard => "copyEmailClipboard",
            MessageKey::Success => "success",
            MessageKey::Error => "error",
            MessageKey::CloseNotification => "closeNotification",
            MessageKey::InvalidEmail => "invalidEmail",
            MessageKey::InvalidEmailDetail => "invalidEmailDetail",
            MessageKey::PermissionDenied => "permissionDenied",
            MessageKey::HttpsRequired => "httpsRequired",
            MessageKey::FallbackCopy => "fallbackCopy",
            MessageKey::CopyFailedManual => "copyFailedManual",
            MessageKey::RetryAttempt => "retryAttempt",
            MessageKey::EmailCopied => "emailCopied",
        }
    }
}

impl MessageStrings {
    pub fn get(&self, key: MessageKey) -> &'static str {
        match key {
            MessageKey::Copy => self.copy,
            MessageKey::Copying => self.copying,
            MessageKey::Retrying => self.retrying,
            MessageKey::Copied => self.copied,
            MessageKey::CopyEmailClipboard => self.copy_email_clipboard,
            MessageKey::Success => self.success,
            MessageKey::Error => self.error,
            MessageKey::CloseNotification => self.close_notification,
            MessageKey::InvalidEmail => self.invalid_email,
            MessageKey::InvalidEmailDetail => self.invalid_email_detail,
            MessageKey::PermissionDenied => self.permission_denied,
            MessageKey::HttpsRequired => self.https_required,
            MessageKey::FallbackCopy => self.fallback_copy,
            MessageKey::CopyFailedManual => self.copy_failed_manual,
            MessageKey::RetryAttempt => self.retry_attempt,
            MessageKey::EmailCopied => self.email_copied,
        }
    }
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: MessageStrings = MessageStrings {
    // Control labels
    copy: "Copy my email address",
    copying: "Copying...",
    retrying: "Retrying... ({current}/{max})",
    copied: "Email is Copied!",
    copy_email_clipboard: "Copy email address to clipboard",

    // Toasts
    success: "Email copied to clipboard!",
    error: "Failed to copy email",
    close_notification: "Close notification",

    // Failures
    invalid_email: "Invalid email format",
    invalid_email_detail: "{reason}: {email}",
    permission_denied: "Please allow clipboard access or copy manually",
    https_required: "Clipboard access requires HTTPS. Please copy manually",
    fallback_copy: "Please copy manually",
    copy_failed_manual: "Failed to copy email. {reason}: {email}",

    // Announcements
    retry_attempt: "Retrying to copy email, attempt {count}",
    email_copied: "Email copied to clipboard",
};

// ==================== Spanish Strings ====================

pub const SPANISH_STRINGS: MessageStrings = MessageStrings {
    // Control labels
    copy: "Copiar mi dirección de correo",
    copying: "Copiando...",
    retrying: "Reintentando... ({current}/{max})",
    copied: "¡Correo Copiado!",
    copy_email_clipboard: "Copiar dirección de correo al portapapeles",

    // Toasts
    success: "¡Correo copiado al portapapeles!",
    error: "Error al copiar correo",
    close_notification: "Cerrar notificación",

    // Failures
    invalid_email: "Formato de correo inválido",
    invalid_email_detail: "{reason}: {email}",
    permission_denied: "Permite acceso al portapapeles o copia manualmente",
    https_required: "El acceso al portapapeles requiere HTTPS. Copia manualmente",
    fallback_copy: "Por favor copia manualmente",
    copy_failed_manual: "Error al copiar correo. {reason}: {email}",

    // Announcements
    retry_attempt: "Reintentando copiar correo, intento {count}",
    email_copied: "Correo copiado al portapapeles",
};

// ==================== French Strings ====================

pub const FRENCH_STRINGS: MessageStrings = MessageStrings {
    // Control labels
    copy: "Copier mon adresse email",
    copying: "Copie en cours...",
    retrying: "Nouvelle tentative... ({current}/{max})",
    copied: "Email Copié!",
    copy_email_clipboard: "Copier l'adresse email dans le presse-papiers",

    // Toasts
    success: "Email copié dans le presse-papiers!",
    error: "Échec de la copie de l'email",
    close_notification: "Fermer la notification",

    // Failures
    invalid_email: "Format d'email invalide",
    invalid_email_detail: "{reason} : {email}",
    permission_denied: "Veuillez autoriser l'accès au presse-papiers ou copier manuellement",
    https_required: "L'accès au presse-papiers nécessite HTTPS. Veuillez copier manuellement",
    fallback_copy: "Veuillez copier manuellement",
    copy_failed_manual: "Échec de la copie de l'email. {reason} : {email}",

    // Announcements
    retry_attempt: "Nouvelle tentative de copie de l'email, tentative {count}",
    email_copied: "Email copié dans le presse-papiers",
};
