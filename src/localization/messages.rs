use crate::broadcast::content::PostContent;
use crate::broadcast::dispatcher::DeliveryReport;
use crate::recipient_store::UsageStatistics;

/// supported languages for the bot UI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    En,
    #[default]
    Ru,
}

impl Lang {
    /// creates Lang from Telegram's language_code (e.g., "ru", "en", "uk")
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("en") => Lang::En,
            _ => Lang::Ru,
        }
    }
}

// =============================================================================
// Inline keyboard labels
// =============================================================================

impl Lang {
    pub fn btn_open_app(&self) -> &'static str {
        match self {
            Lang::En => "Open",
            Lang::Ru => "Открыть",
        }
    }

    pub fn btn_add_button(&self) -> &'static str {
        match self {
            Lang::En => "➕ Add button",
            Lang::Ru => "➕ Добавить кнопку",
        }
    }

    pub fn btn_skip_button(&self) -> &'static str {
        match self {
            Lang::En => "➡️ Skip",
            Lang::Ru => "➡️ Пропустить",
        }
    }

    pub fn btn_kind_link(&self) -> &'static str {
        match self {
            Lang::En => "🔗 Link",
            Lang::Ru => "🔗 Ссылка",
        }
    }

    pub fn btn_kind_app(&self) -> &'static str {
        match self {
            Lang::En => "🛍 Shop app",
            Lang::Ru => "🛍 Приложение",
        }
    }

    pub fn btn_confirm(&self) -> &'static str {
        match self {
            Lang::En => "✅ Send",
            Lang::Ru => "✅ Отправить",
        }
    }

    pub fn btn_cancel(&self) -> &'static str {
        match self {
            Lang::En => "❌ Cancel",
            Lang::Ru => "❌ Отменить",
        }
    }
}

// =============================================================================
// User-facing messages
// =============================================================================

impl Lang {
    pub fn welcome(&self) -> &'static str {
        match self {
            Lang::En => "Welcome!\nUse the button below to open the app 👇",
            Lang::Ru => "Добро пожаловать!\nВоспользуйтесь кнопкой, чтобы открыть приложение 👇",
        }
    }

    pub fn error_account_access(&self) -> &'static str {
        match self {
            Lang::En => {
                "❌ Sorry, there was an error accessing your account. Please try again later."
            }
            Lang::Ru => {
                "❌ Извините, произошла ошибка при доступе к вашему аккаунту. Попробуйте позже."
            }
        }
    }
}

// =============================================================================
// Mailing dialog
// =============================================================================

impl Lang {
    pub fn not_permitted(&self) -> &'static str {
        match self {
            Lang::En => "⛔ This command is available to administrators only.",
            Lang::Ru => "⛔ Эта команда доступна только администраторам.",
        }
    }

    pub fn mailing_enter_content(&self) -> &'static str {
        match self {
            Lang::En => {
                "📨 New broadcast.\n\nSend the post content: text, a photo, a video, \
                a document or an album of several media files."
            }
            Lang::Ru => {
                "📨 Новая рассылка.\n\nОтправьте содержимое поста: текст, фото, видео, \
                документ или альбом из нескольких медиафайлов."
            }
        }
    }

    pub fn mailing_restarted(&self) -> &'static str {
        match self {
            Lang::En => "♻️ The previous draft was discarded.",
            Lang::Ru => "♻️ Предыдущий черновик рассылки сброшен.",
        }
    }

    pub fn mailing_add_button_question(&self) -> &'static str {
        match self {
            Lang::En => "Attach a button to the post?",
            Lang::Ru => "Добавить кнопку к посту?",
        }
    }

    pub fn mailing_choose_kind(&self) -> &'static str {
        match self {
            Lang::En => "Choose the button type: an external link or the shop app.",
            Lang::Ru => "Выберите тип кнопки: внешняя ссылка или приложение магазина.",
        }
    }

    pub fn mailing_enter_label(&self) -> &'static str {
        match self {
            Lang::En => "Send the button label.",
            Lang::Ru => "Отправьте текст кнопки.",
        }
    }

    pub fn mailing_enter_target(&self) -> &'static str {
        match self {
            Lang::En => "Send the button link (must start with http:// or https://).",
            Lang::Ru => "Отправьте ссылку для кнопки (должна начинаться с http:// или https://).",
        }
    }

    pub fn mailing_invalid_target(&self) -> &'static str {
        match self {
            Lang::En => {
                "❌ Invalid link. The address must start with http:// or https://. Try again."
            }
            Lang::Ru => {
                "❌ Некорректная ссылка. Адрес должен начинаться с http:// или https://. \
                Попробуйте ещё раз."
            }
        }
    }

    /// `button_label` must already be HTML-escaped by the caller
    pub fn mailing_confirm_question(
        &self,
        content: &PostContent,
        button_label: Option<&str>,
    ) -> String {
        let kind = self.content_kind_name(content);
        match self {
            Lang::En => match button_label {
                Some(label) => format!(
                    "👆 Preview above.\n\nPost: {}, button: <b>{}</b>.\nSend it to all users?",
                    kind, label
                ),
                None => format!(
                    "👆 Preview above.\n\nPost: {}, no button.\nSend it to all users?",
                    kind
                ),
            },
            Lang::Ru => match button_label {
                Some(label) => format!(
                    "👆 Предпросмотр выше.\n\nПост: {}, кнопка: <b>{}</b>.\nОтправить всем пользователям?",
                    kind, label
                ),
                None => format!(
                    "👆 Предпросмотр выше.\n\nПост: {}, без кнопки.\nОтправить всем пользователям?",
                    kind
                ),
            },
        }
    }

    fn content_kind_name(&self, content: &PostContent) -> String {
        match self {
            Lang::En => match content {
                PostContent::Text { .. } => "text".to_string(),
                PostContent::Photo { .. } => "photo".to_string(),
                PostContent::Video { .. } => "video".to_string(),
                PostContent::Document { .. } => "document".to_string(),
                PostContent::MediaGroup { items } => format!("album of {} files", items.len()),
            },
            Lang::Ru => match content {
                PostContent::Text { .. } => "текст".to_string(),
                PostContent::Photo { .. } => "фото".to_string(),
                PostContent::Video { .. } => "видео".to_string(),
                PostContent::Document { .. } => "документ".to_string(),
                PostContent::MediaGroup { items } => {
                    format!("альбом из {} файлов", items.len())
                }
            },
        }
    }

    pub fn mailing_preview_failed(&self, detail: &str) -> String {
        match self {
            Lang::En => format!(
                "⚠️ Failed to render the preview: {}.\nYou can still send or cancel the broadcast.",
                detail
            ),
            Lang::Ru => format!(
                "⚠️ Не удалось показать предпросмотр: {}.\nРассылку всё ещё можно отправить или отменить.",
                detail
            ),
        }
    }

    pub fn mailing_cancelled(&self) -> &'static str {
        match self {
            Lang::En => "🚫 Broadcast cancelled.",
            Lang::Ru => "🚫 Рассылка отменена.",
        }
    }

    pub fn mailing_no_session(&self) -> &'static str {
        match self {
            Lang::En => "ℹ️ No active broadcast. Start one with /mailing.",
            Lang::Ru => "ℹ️ Нет активной рассылки. Начните новую командой /mailing.",
        }
    }

    pub fn mailing_session_expired(&self) -> &'static str {
        match self {
            Lang::En => "⌛ This broadcast draft has expired. Start a new one with /mailing.",
            Lang::Ru => "⌛ Этот черновик рассылки устарел. Начните новую командой /mailing.",
        }
    }

    pub fn mailing_in_progress(&self) -> &'static str {
        match self {
            Lang::En => "⏳ Broadcasting, please wait...",
            Lang::Ru => "⏳ Рассылка выполняется, подождите...",
        }
    }

    pub fn mailing_started_ack(&self) -> &'static str {
        match self {
            Lang::En => "🚀 Broadcast started.",
            Lang::Ru => "🚀 Рассылка запущена.",
        }
    }

    pub fn mailing_report(&self, report: &DeliveryReport) -> String {
        let rate = report.success_rate() * 100.0;
        let elapsed = report.elapsed.as_secs_f64();
        match self {
            Lang::En => format!(
                "📬 <b>Broadcast finished</b>\n\n\
                Recipients: <b>{}</b>\n\
                Delivered: <b>{}</b> ({:.1}%)\n\
                Failed: <b>{}</b>\n\
                Blocked or unreachable: <b>{}</b>\n\
                Took: {:.1} s",
                report.total_recipients,
                report.succeeded,
                rate,
                report.failed,
                report.blocked_or_unreachable,
                elapsed
            ),
            Lang::Ru => format!(
                "📬 <b>Рассылка завершена</b>\n\n\
                Получателей: <b>{}</b>\n\
                Доставлено: <b>{}</b> ({:.1}%)\n\
                Не доставлено: <b>{}</b>\n\
                Заблокировали или недоступны: <b>{}</b>\n\
                Заняло: {:.1} с",
                report.total_recipients,
                report.succeeded,
                rate,
                report.failed,
                report.blocked_or_unreachable,
                elapsed
            ),
        }
    }

    pub fn error_recipient_list(&self) -> &'static str {
        match self {
            Lang::En => "❌ Failed to load the recipient list. The broadcast was not sent.",
            Lang::Ru => "❌ Не удалось получить список получателей. Рассылка не отправлена.",
        }
    }
}

// =============================================================================
// Statistics
// =============================================================================

impl Lang {
    pub fn stats_report(&self, stats: &UsageStatistics) -> String {
        let format_date = |date: Option<chrono::DateTime<chrono::Utc>>| {
            date.map(|d| d.format("%d.%m.%Y").to_string())
                .unwrap_or_else(|| "—".to_string())
        };
        match self {
            Lang::En => format!(
                "📊 <b>Shop statistics</b>\n\n\
                Users: <b>{}</b>\n\
                New today: <b>{}</b>\n\
                New in 7 days: <b>{}</b>\n\
                New in 30 days: <b>{}</b>\n\
                Total balance: <b>{:.2}</b>\n\
                Total spent: <b>{:.2}</b>\n\
                First join: {}\n\
                Last join: {}",
                stats.total_users,
                stats.new_today,
                stats.new_last_7d,
                stats.new_last_30d,
                stats.total_balance,
                stats.total_spent,
                format_date(stats.first_join),
                format_date(stats.last_join)
            ),
            Lang::Ru => format!(
                "📊 <b>Статистика магазина</b>\n\n\
                Пользователей: <b>{}</b>\n\
                Новых сегодня: <b>{}</b>\n\
                Новых за 7 дней: <b>{}</b>\n\
                Новых за 30 дней: <b>{}</b>\n\
                Суммарный баланс: <b>{:.2}</b>\n\
                Всего потрачено: <b>{:.2}</b>\n\
                Первая регистрация: {}\n\
                Последняя регистрация: {}",
                stats.total_users,
                stats.new_today,
                stats.new_last_7d,
                stats.new_last_30d,
                stats.total_balance,
                stats.total_spent,
                format_date(stats.first_join),
                format_date(stats.last_join)
            ),
        }
    }

    pub fn stats_failed(&self) -> &'static str {
        match self {
            Lang::En => "❌ Failed to load statistics. Please try again later.",
            Lang::Ru => "❌ Не удалось загрузить статистику. Попробуйте позже.",
        }
    }
}
