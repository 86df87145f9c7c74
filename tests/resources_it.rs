// crates.io
use httpmock::prelude::*;
// self
use context_io::{
	_preludet::*,
	client::Client,
	error::ClientErrorKind,
	resource::{
		Account, AccountId, AccountQuery, BodyFormat, ConnectToken, Contact, ContactQuery,
		Discovery, File, FileQuery, Folder, Message, MessageId, NewConnectToken, OAuthProvider,
		Source, SourceLabel, SourceStatus,
	},
};

fn client_for(server: &MockServer, recorder: &RecordingTransport) -> Client {
	build_recording_client(&server.base_url(), Some(("K", "S")), recorder)
}

fn account_id() -> AccountId {
	AccountId::new("4f01").expect("Account fixture should be valid.")
}

#[tokio::test]
async fn accounts_list_find_and_save() {
	let server = MockServer::start_async().await;
	let recorder = RecordingTransport::forwarding();
	let client = client_for(&server, &recorder);
	let listing = server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts").query_param("status", "OK");
			then.status(200).header("content-type", "application/json").body(
				r#"[{"id":"4f01","email_addresses":["me@example.com"],"created":1300000000,"sources":[{"label":"me::imap","port":"993"}]}]"#,
			);
		})
		.await;
	let query = AccountQuery { status: Some(SourceStatus::Ok), ..Default::default() };
	let accounts = Account::all(&client, &query).await.expect("Listing accounts should succeed.");

	listing.assert_async().await;

	assert_eq!(accounts.len(), 1);
	assert_eq!(accounts[0].id, Some(account_id()));
	assert_eq!(accounts[0].sources[0].account_id, Some(account_id()));
	assert_eq!(accounts[0].sources[0].port, Some(993));

	let creation = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/2.0/accounts")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).body(r#"{"success":true,"id":"4f02","resource_url":"x"}"#);
		})
		.await;
	let mut account = Account::new("new@example.com").with_first_name("Ada");

	assert!(account.save(&client).await.expect("Creating the account should succeed."));

	creation.assert_async().await;

	assert_eq!(account.id.as_deref(), Some("4f02"));
	assert_eq!(
		recorder.bodies().last().map(String::as_str),
		Some("email=new%40example.com&first_name=Ada")
	);

	let update = server
		.mock_async(|when, then| {
			when.method(PUT).path("/2.0/accounts/4f02");
			then.status(200).body(r#"{"success":true}"#);
		})
		.await;

	account.last_name = Some("Lovelace".into());

	assert!(account.save(&client).await.expect("Updating the account should succeed."));

	update.assert_async().await;

	assert_eq!(
		recorder.bodies().last().map(String::as_str),
		Some("first_name=Ada&last_name=Lovelace")
	);
}

#[tokio::test]
async fn missing_account_maps_to_not_found() {
	let server = MockServer::start_async().await;
	let client = client_for(&server, &RecordingTransport::forwarding());

	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts/4f01");
			then.status(404).body(r#"{"type":"error","value":"account not found"}"#);
		})
		.await;

	let err = Account::find(&client, &account_id()).await.expect_err("404 should raise.");

	assert!(matches!(err, Error::Client { kind: ClientErrorKind::NotFound, .. }));
	assert_eq!(err.message(), Some("account not found"));
}

#[tokio::test]
async fn account_creation_requires_an_email() {
	let server = MockServer::start_async().await;
	let recorder = RecordingTransport::forwarding();
	let client = client_for(&server, &recorder);
	let err = Account::default().save(&client).await.expect_err("Creation without email.");

	assert!(matches!(err, Error::InvalidArgument { .. }));
	assert!(recorder.requests().is_empty());
}

#[tokio::test]
async fn sources_and_folders() {
	let server = MockServer::start_async().await;
	let recorder = RecordingTransport::forwarding();
	let client = client_for(&server, &recorder);
	let label = SourceLabel::new("me::imap").expect("Label fixture should be valid.");

	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts/4f01/sources/me::imap");
			then.status(200).body(
				r#"{"label":"me::imap","email":"me@example.com","server":"imap.example.com","username":"me","use_ssl":true,"port":993,"type":"IMAP","status":"OK"}"#,
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts/4f01/sources/me::imap/folders");
			then.status(200)
				.body(r#"[{"name":"INBOX","delim":"/","nb_messages":12},{"name":"Work/2024","delim":"/"}]"#);
		})
		.await;

	let create_folder = server
		.mock_async(|when, then| {
			when.method(PUT).path("/2.0/accounts/4f01/sources/me::imap/folders/Archive");
			then.status(200).body(r#"{"success":true}"#);
		})
		.await;
	let destroy = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/2.0/accounts/4f01/sources/me::imap");
			then.status(200).body(r#"{"success":true}"#);
		})
		.await;
	let mut source =
		Source::find(&client, &account_id(), &label).await.expect("Finding the source should work.");

	assert_eq!(source.account_id, Some(account_id()));
	assert_eq!(source.port, Some(993));

	let folders = source.folders(&client).await.expect("Listing folders should work.");

	assert_eq!(folders.len(), 2);
	assert_eq!(folders[1].leaf_name(), "2024");
	assert_eq!(folders[0].source_label.as_ref(), Some(&label));
	assert!(
		Folder::create(&client, &account_id(), &label, "Archive", Some("/"))
			.await
			.expect("Creating a folder should work.")
	);

	create_folder.assert_async().await;

	assert_eq!(recorder.bodies().last().map(String::as_str), Some("delim=%2F"));
	assert!(source.destroy(&client).await.expect("Deleting the source should work."));

	destroy.assert_async().await;

	assert_eq!(source.label, None);
}

#[tokio::test]
async fn incomplete_source_is_rejected_locally() {
	let server = MockServer::start_async().await;
	let recorder = RecordingTransport::forwarding();
	let client = client_for(&server, &recorder);
	let mut source = Source::new(account_id());

	source.email = Some("me@example.com".into());

	let err = source.save(&client).await.expect_err("Missing server should be rejected.");

	assert!(matches!(err, Error::InvalidArgument { .. }));
	assert!(recorder.requests().is_empty());
}

#[tokio::test]
async fn message_bodies_are_cached() {
	let server = MockServer::start_async().await;
	let client = client_for(&server, &RecordingTransport::forwarding());

	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts/4f01/messages/m1");
			then.status(200).body(
				r#"{"message_id":"m1","subject":"Hello","date":1300000000,"addresses":{"from":{"email":"a@example.com"},"to":{"email":"b@example.com"}},"folders":["INBOX"]}"#,
			);
		})
		.await;

	let body = server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts/4f01/messages/m1/body");
			then.status(200).body(
				r#"[{"type":"text/plain","content":"hi"},{"type":"text/html","content":"<p>hi</p>"}]"#,
			);
		})
		.await;
	let move_call = server
		.mock_async(|when, then| {
			when.method(POST).path("/2.0/accounts/4f01/messages/m1");
			then.status(200).body(r#"{"success":true}"#);
		})
		.await;
	let message_id = MessageId::new("m1").expect("Message fixture should be valid.");
	let mut message = Message::find(&client, &account_id(), &message_id)
		.await
		.expect("Finding the message should work.");

	assert_eq!(message.addresses.to.len(), 1);
	assert_eq!(
		message.body(&client, BodyFormat::Plain).await.expect("Plain body should load."),
		Some("hi")
	);
	assert_eq!(
		message.body(&client, BodyFormat::Html).await.expect("HTML body should be cached."),
		Some("<p>hi</p>")
	);

	body.assert_calls_async(1).await;

	assert!(message.move_to(&client, "Archive", None).await.expect("Moving should work."));

	move_call.assert_async().await;

	let err = message.copy(&client, "", None).await.expect_err("Empty folder is rejected.");

	assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[tokio::test]
async fn file_content_is_returned_raw() {
	let server = MockServer::start_async().await;
	let client = client_for(&server, &RecordingTransport::forwarding());

	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts/4f01/files").query_param("limit", "1");
			then.status(200).body(r#"[{"file_id":"f1","file_name":"report.pdf","size":4}]"#);
		})
		.await;

	let content = server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts/4f01/files/f1/content");
			then.status(200).header("content-type", "application/pdf").body("%PDF");
		})
		.await;
	let query = FileQuery { limit: Some(1), ..Default::default() };
	let files = File::all(&client, &account_id(), &query).await.expect("Listing files should work.");

	assert_eq!(files.len(), 1);
	assert_eq!(
		files[0].content(&client).await.expect("Downloading should work."),
		b"%PDF".to_vec()
	);

	content.assert_async().await;
}

#[tokio::test]
async fn contacts_unwrap_matches() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let client = client_for(&server, &RecordingTransport::forwarding());

	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/accounts/4f01/contacts").query_param("search", "ada");
			then.status(200).body(
				r#"{"query":{"search":"ada"},"matches":[{"email":"ada@example.com","count":3,"name":"Ada"}]}"#,
			);
		})
		.await;

	let query = ContactQuery { search: Some("ada".into()), ..Default::default() };
	let contacts = Contact::all(&client, &account_id(), &query).await?;

	assert_eq!(contacts.len(), 1);
	assert_eq!(contacts[0].account_id, Some(account_id()));
	assert_eq!(contacts[0].count, Some(3));

	Ok(())
}

#[tokio::test]
async fn contact_emails_stay_in_one_path_segment() {
	let transport = RecordingTransport::replying(r#"{"email":"ignored@example.com"}"#);
	let client = build_recording_client("https://api.context.io", Some(("K", "S")), &transport);
	let cases = [
		("john#doe@example.com", "/2.0/accounts/4f01/contacts/john%23doe%40example.com"),
		("a?b@example.com", "/2.0/accounts/4f01/contacts/a%3Fb%40example.com"),
		("../../oauth_providers", "/2.0/accounts/4f01/contacts/..%2F..%2Foauth_providers"),
	];

	for (email, path) in cases {
		Contact::find(&client, &account_id(), email).await.expect("Lookup should be sent.");

		let request = transport.last();

		assert_eq!(request.url.path(), path);
		assert_eq!(request.url.query(), None);
		assert_eq!(request.url.fragment(), None);
	}

	for email in ["", ".", ".."] {
		let err = Contact::find(&client, &account_id(), email)
			.await
			.expect_err("Unusable emails are rejected locally.");

		assert!(matches!(err, Error::InvalidArgument { .. }));
	}

	assert_eq!(transport.requests().len(), cases.len());
}

#[tokio::test]
async fn discovery_reports_only_found_settings() {
	let server = MockServer::start_async().await;
	let client = client_for(&server, &RecordingTransport::forwarding());

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/2.0/discovery")
				.query_param("source_type", "IMAP")
				.query_param("email", "me@gmail.com");
			then.status(200).body(
				r#"{"email":"me@gmail.com","found":true,"type":"gmail","imap":{"server":"imap.gmail.com","port":993,"use_ssl":true}}"#,
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/discovery").query_param("email", "me@unknown.test");
			then.status(200).body(r#"{"email":"me@unknown.test","found":false}"#);
		})
		.await;

	let found = Discovery::discover(&client, "imap", "me@gmail.com")
		.await
		.expect("Discovery should work.")
		.expect("Settings should be found.");

	assert_eq!(found.imap.server.as_deref(), Some("imap.gmail.com"));
	assert_eq!(
		Discovery::discover(&client, "imap", "me@unknown.test").await.expect("Discovery should work."),
		None
	);
}

#[tokio::test]
async fn oauth_providers_round_trip() {
	let server = MockServer::start_async().await;
	let recorder = RecordingTransport::forwarding();
	let client = client_for(&server, &recorder);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/oauth_providers");
			then.status(200).body(
				r#"[{"type":"GMAIL","provider_consumer_key":"key.apps","provider_consumer_secret":"hush"}]"#,
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/2.0/oauth_providers");
			then.status(200).body(r#"{"success":true,"provider_consumer_key":"key.apps"}"#);
		})
		.await;

	let destroy = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/2.0/oauth_providers/key.apps");
			then.status(200).body(r#"{"success":true}"#);
		})
		.await;

	assert!(
		OAuthProvider::create(&client, "gmail", "key.apps", &"hush".into())
			.await
			.expect("Registering should work.")
	);
	assert_eq!(
		recorder.bodies().last().map(String::as_str),
		Some("type=GMAIL&provider_consumer_key=key.apps&provider_consumer_secret=hush")
	);

	let providers = OAuthProvider::all(&client).await.expect("Listing providers should work.");

	assert_eq!(providers[0].provider_type.as_deref(), Some("GMAIL"));
	assert!(providers[0].destroy(&client).await.expect("Removing should work."));

	destroy.assert_async().await;
}

#[tokio::test]
async fn connect_tokens_follow_scope() {
	let server = MockServer::start_async().await;
	let client = client_for(&server, &RecordingTransport::forwarding());
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/2.0/accounts/4f01/connect_tokens");
			then.status(200).body(
				r#"{"success":true,"token":"tok123","resource_url":"x","browser_redirect_url":"https://connect.example.com/tok123"}"#,
			);
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/2.0/connect_tokens");
			then.status(200)
				.body(r#"[{"token":"tok123","email":"me@example.com","used":0,"account":[]}]"#);
		})
		.await;

	let request = NewConnectToken::new(
		"https://example.com/callback".parse().expect("Callback fixture should be valid."),
	);
	let created = ConnectToken::create(&client, &request, Some(&account_id()))
		.await
		.expect("Creating a token should work.");

	create.assert_async().await;

	assert_eq!(created.token_id.as_ref(), "tok123");
	assert_eq!(created.redirect_url, "https://connect.example.com/tok123");

	let tokens = ConnectToken::all(&client, None).await.expect("Listing tokens should work.");

	assert_eq!(tokens.len(), 1);
	assert_eq!(tokens[0].account, None);
}
