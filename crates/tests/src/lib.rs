#[cfg(test)]
mod common;

#[cfg(test)]
mod auth_tests;



#[cfg(test)]
mod client_tests;

#[cfg(test)]
mod hearing_tests;

#[cfg(test)]
mod document_tests;

#[cfg(test)]
mod notification_tests;

#[cfg(test)]
mod schedule_tests;

#[cfg(test)]
mod dashboard_tests;


#[cfg(test)]
mod payment_tests;
