mod test_health;
mod test_login;
mod test_logout;
mod test_login_properties;
