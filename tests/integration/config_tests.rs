use gift_shop_bot::config::BotConfig;

#[test]
fn test_admin_ids_parsing() {
    assert_eq!(
        BotConfig::parse_admin_ids("123456789,987654321"),
        vec![123456789, 987654321]
    );
    // whitespace around entries is tolerated
    assert_eq!(BotConfig::parse_admin_ids(" 1 , 2 ,3 "), vec![1, 2, 3]);
    // non-numeric entries are skipped, matching the .env format docs
    assert_eq!(BotConfig::parse_admin_ids("abc,42,"), vec![42]);
    assert!(BotConfig::parse_admin_ids("").is_empty());
}
